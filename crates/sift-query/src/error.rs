use std::fmt;

/// Client-input errors raised while translating a request into a query.
///
/// All variants are caller mistakes — the engine never retries or repairs
/// them; the surrounding handler maps them to a client-facing rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    InvalidIdentifier(String),
    MalformedOperatorValue(String),
    InvalidOptionValue(String),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::InvalidIdentifier(value) => {
                write!(f, "invalid identifier: {value:?}")
            }
            QueryError::MalformedOperatorValue(msg) => {
                write!(f, "malformed operator value: {msg}")
            }
            QueryError::InvalidOptionValue(msg) => {
                write!(f, "invalid option value: {msg}")
            }
        }
    }
}

impl std::error::Error for QueryError {}
