use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Protocol requests by resource (manifest, catalog, meta, stream)
    pub static ref REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "streamcine_requests_total",
        "Add-on protocol requests by resource",
        &["resource"]
    )
    .unwrap();

    /// Catalog file loads; each catalog should load once per process
    pub static ref CATALOG_LOADS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "streamcine_catalog_loads_total",
        "Catalog files loaded from disk",
        &["catalog"]
    )
    .unwrap();
}
