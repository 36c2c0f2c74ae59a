use bson::{Bson, Document};
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Result limit applied when neither the request nor the defaults set one,
/// or when the request asks for a non-positive limit.
const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A single-key sort specification, parsed from the `sort` option syntax:
/// a leading `-` means descending on the remainder of the string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

pub(crate) fn raw_get<'a>(raw: &'a [(String, String)], key: &str) -> Option<&'a str> {
    raw.iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Resolve the result limit. Single-document routes force 1 unconditionally;
/// otherwise an explicit argument wins (falling back to the default when it
/// is not positive), then the staged default, then 10. Always set.
pub(crate) fn resolve_limit(
    single_result: bool,
    raw: &[(String, String)],
    staged: &Document,
) -> Result<i64, QueryError> {
    if single_result {
        return Ok(1);
    }

    if let Some(value) = raw_get(raw, "limit") {
        let limit = parse_int("limit", value)?;
        return Ok(if limit >= 1 { limit } else { DEFAULT_LIMIT });
    }

    match staged.get("limit") {
        Some(value) => staged_int("limit", value),
        None => Ok(DEFAULT_LIMIT),
    }
}

/// Resolve the skip offset. Present only when the request or the defaults
/// set one; non-positive requests clamp to 0.
pub(crate) fn resolve_skip(
    raw: &[(String, String)],
    staged: &Document,
) -> Result<Option<i64>, QueryError> {
    if let Some(value) = raw_get(raw, "skip") {
        let skip = parse_int("skip", value)?;
        return Ok(Some(if skip >= 1 { skip } else { 0 }));
    }

    match staged.get("skip") {
        Some(value) => staged_int("skip", value).map(Some),
        None => Ok(None),
    }
}

/// Resolve the sort order from the request argument or the staged default,
/// both using the leading-`-` syntax. Empty or non-string values resolve
/// to no sort.
pub(crate) fn resolve_sort(raw: &[(String, String)], staged: &Document) -> Option<Sort> {
    let value = match raw_get(raw, "sort") {
        Some(value) if !value.is_empty() => value,
        _ => match staged.get("sort") {
            Some(Bson::String(value)) if !value.is_empty() => value.as_str(),
            _ => return None,
        },
    };

    match value.strip_prefix('-') {
        Some(field) => Some(Sort {
            field: field.to_string(),
            direction: SortDirection::Desc,
        }),
        None => Some(Sort {
            field: value.to_string(),
            direction: SortDirection::Asc,
        }),
    }
}

/// Resolve the projection field list from the request argument (split on
/// `,`) or the staged default (comma string or array of strings).
pub(crate) fn resolve_projection(
    raw: &[(String, String)],
    staged: &Document,
) -> Option<Vec<String>> {
    if let Some(value) = raw_get(raw, "projection") {
        if !value.is_empty() {
            return Some(split_fields(value));
        }
    }

    match staged.get("projection") {
        Some(Bson::String(value)) if !value.is_empty() => Some(split_fields(value)),
        Some(Bson::Array(items)) => Some(
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
        ),
        _ => None,
    }
}

fn split_fields(value: &str) -> Vec<String> {
    value.split(',').map(str::to_string).collect()
}

fn parse_int(option: &str, value: &str) -> Result<i64, QueryError> {
    value
        .parse::<i64>()
        .map_err(|_| QueryError::InvalidOptionValue(format!("{option}: {value:?}")))
}

/// Staged defaults arrive from a JSON document, so integers may be typed
/// or quoted.
fn staged_int(option: &str, value: &Bson) -> Result<i64, QueryError> {
    match value {
        Bson::Int32(n) => Ok(i64::from(*n)),
        Bson::Int64(n) => Ok(*n),
        Bson::String(s) => parse_int(option, s),
        other => Err(QueryError::InvalidOptionValue(format!(
            "{option}: {other:?}"
        ))),
    }
}
