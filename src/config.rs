use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Catalog sources
    pub data_dir: PathBuf,
    pub channels_file: String,
    pub movies_file: String,
    pub personal_movies_file: String,
    pub series_file: String,
    pub soap_operas_file: String,

    // Presentation
    pub default_poster: String,

    // Playlist dump
    pub fetch_timeout_ms: u64,
    pub max_retries: u32,
    pub dump_output_file: String,

    // Misc
    pub user_agent: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            // Server
            port: env::var("PORT")
                .unwrap_or_else(|_| "7000".to_string())
                .parse()
                .unwrap_or(7000),

            // Catalog sources
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            channels_file: env::var("CHANNELS_FILE")
                .unwrap_or_else(|_| "canais_tv.csv".to_string()),
            movies_file: env::var("MOVIES_FILE").unwrap_or_else(|_| "filmes.csv".to_string()),
            personal_movies_file: env::var("PERSONAL_MOVIES_FILE")
                .unwrap_or_else(|_| "filmes_pessoais.csv".to_string()),
            series_file: env::var("SERIES_FILE")
                .unwrap_or_else(|_| "series_episodios.csv".to_string()),
            soap_operas_file: env::var("SOAP_OPERAS_FILE")
                .unwrap_or_else(|_| "novelas.csv".to_string()),

            // Generic poster for entries without a logo
            default_poster: env::var("DEFAULT_POSTER").unwrap_or_else(|_| {
                "https://www.stremio.com/website/stremio-logo-small.png".to_string()
            }),

            // Playlist dump
            fetch_timeout_ms: env::var("FETCH_TIMEOUT_MS")
                .unwrap_or_else(|_| "300000".to_string())
                .parse()
                .unwrap_or(300_000), // 5 minutes

            max_retries: env::var("MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap_or(3),

            dump_output_file: env::var("DUMP_OUTPUT_FILE")
                .unwrap_or_else(|_| "canais_streamcine.csv".to_string()),

            // Misc - Use VLC user agent to avoid IPTV server blocks
            user_agent: env::var("USER_AGENT")
                .unwrap_or_else(|_| "VLC/3.0.20 LibVLC/3.0.20".to_string()),
        }
    }

    /// Configuration rooted at `data_dir` with every other value at its default.
    /// Used by tests so they never depend on the process environment.
    #[cfg(test)]
    pub fn for_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            port: 7000,
            data_dir: data_dir.into(),
            channels_file: "canais_tv.csv".to_string(),
            movies_file: "filmes.csv".to_string(),
            personal_movies_file: "filmes_pessoais.csv".to_string(),
            series_file: "series_episodios.csv".to_string(),
            soap_operas_file: "novelas.csv".to_string(),
            default_poster: "https://www.stremio.com/website/stremio-logo-small.png".to_string(),
            fetch_timeout_ms: 300_000,
            max_retries: 3,
            dump_output_file: "canais_streamcine.csv".to_string(),
            user_agent: "VLC/3.0.20 LibVLC/3.0.20".to_string(),
        }
    }
}
