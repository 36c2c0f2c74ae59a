mod collection;
mod error;
mod matcher;

pub use collection::{DeleteOutcome, InsertOutcome, MemoryCollection, UpdateOutcome};
pub use error::StoreError;
pub use matcher::matches;
