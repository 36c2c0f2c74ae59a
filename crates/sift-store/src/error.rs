use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    /// The filter document contains an operator the matcher does not know.
    InvalidFilter(String),
    /// A document with the same `_id` already exists.
    DuplicateId(String),
    Storage(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::InvalidFilter(msg) => write!(f, "invalid filter: {msg}"),
            StoreError::DuplicateId(id) => write!(f, "duplicate _id: {id}"),
            StoreError::Storage(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}
