pub mod addon;
pub mod catalog_store;
pub mod csv_reader;
pub mod ids;
pub mod loaders;
pub mod metrics;
pub mod name_parser;
pub mod playlist_dump;
pub mod stream_selector;
