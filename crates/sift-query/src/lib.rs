mod build;
mod error;
mod operator;
mod options;
mod query;
mod value;

pub use build::{build_query, expand_arguments};
pub use error::QueryError;
pub use operator::{Expanded, ExpandedValue, expand};
pub use options::{Sort, SortDirection};
pub use query::{QueryDefaults, QuerySpec};
pub use value::{ID_FIELD, coerce, parse_datetime};
