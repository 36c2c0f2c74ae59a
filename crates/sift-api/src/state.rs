use std::sync::Arc;

use sift_query::QueryDefaults;
use sift_store::MemoryCollection;

#[derive(Clone)]
pub struct AppState {
    pub collection: Arc<MemoryCollection>,
    pub defaults: Arc<QueryDefaults>,
    pub debug: bool,
}

/// Parse the deployment's default filter and options from their JSON
/// configuration strings.
pub fn parse_defaults(filter: &str, options: &str) -> Result<QueryDefaults, serde_json::Error> {
    Ok(QueryDefaults {
        filter: serde_json::from_str(filter)?,
        options: serde_json::from_str(options)?,
    })
}
