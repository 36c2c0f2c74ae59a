use bson::Document;
use serde::{Deserialize, Serialize};

use crate::options::Sort;

/// Server-configured default constraints, parsed once at startup and
/// threaded into every build — never ambient state.
///
/// Both documents use the same value syntax the engine understands: filter
/// values may be micro-language strings or pre-typed JSON, and options may
/// pre-set any of the reserved keys (`limit`, `projection`, `skip`, `sort`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryDefaults {
    #[serde(default)]
    pub filter: Document,
    #[serde(default)]
    pub options: Document,
}

/// One fully translated query: the filter document plus resolved options.
///
/// `limit` is always present; the remaining options only when meaningfully
/// set. Built fresh per request and handed to the storage collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub filter: Document,
    pub limit: i64,
    pub skip: Option<i64>,
    pub sort: Option<Sort>,
    pub projection: Option<Vec<String>>,
}
