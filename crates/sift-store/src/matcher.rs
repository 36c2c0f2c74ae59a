use std::cmp::Ordering;

use bson::{Bson, Document};
use regex::Regex;
use sift_query::parse_datetime;

use crate::error::StoreError;

/// Evaluate whether a document matches the given filter.
///
/// Follows MongoDB query semantics for the operator set the query engine
/// emits:
/// - top-level entries are an implicit AND
/// - `{ "field": value }` is implicit `$eq`; `null` matches missing fields
/// - `{ "field": { "$gt": v, ... } }` uses operator sub-documents
/// - `$and` / `$or` / `$nor` take arrays of sub-filters
/// - a plain sub-document condition applies recursively, so nested-field
///   clauses reach into embedded documents
///
/// Comparison operands may be raw strings (the engine leaves payloads
/// untyped); they coerce against the stored value's type.
pub fn matches(document: &Document, filter: &Document) -> Result<bool, StoreError> {
    for (key, condition) in filter {
        let hit = match key.as_str() {
            "$and" => {
                let mut all = true;
                for sub in sub_filters(key, condition)? {
                    if !matches(document, sub)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => {
                let mut any = false;
                for sub in sub_filters(key, condition)? {
                    if matches(document, sub)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            "$nor" => {
                let mut none = true;
                for sub in sub_filters(key, condition)? {
                    if matches(document, sub)? {
                        none = false;
                        break;
                    }
                }
                none
            }
            "$text" => text_matches(document, condition)?,
            key if key.starts_with('$') => {
                return Err(StoreError::InvalidFilter(format!(
                    "unknown top-level operator: {key}"
                )));
            }
            field => field_matches(document, field, condition)?,
        };

        if !hit {
            return Ok(false);
        }
    }

    Ok(true)
}

fn sub_filters<'a>(operator: &str, condition: &'a Bson) -> Result<Vec<&'a Document>, StoreError> {
    let Bson::Array(items) = condition else {
        return Err(StoreError::InvalidFilter(format!(
            "{operator} value must be an array"
        )));
    };

    items
        .iter()
        .map(|item| match item {
            Bson::Document(sub) => Ok(sub),
            other => Err(StoreError::InvalidFilter(format!(
                "{operator} array elements must be documents, got {other}"
            ))),
        })
        .collect()
}

/// `$text` without a text index: case-insensitive substring search of each
/// whitespace-separated term over the document's top-level string values.
/// Any matching term counts as a hit.
fn text_matches(document: &Document, condition: &Bson) -> Result<bool, StoreError> {
    let search = match condition {
        Bson::Document(spec) => match spec.get("$search") {
            Some(Bson::String(s)) => s,
            _ => {
                return Err(StoreError::InvalidFilter(
                    "$text requires a string $search".to_string(),
                ));
            }
        },
        _ => {
            return Err(StoreError::InvalidFilter(
                "$text value must be a document".to_string(),
            ));
        }
    };

    let terms: Vec<String> = search
        .split_whitespace()
        .map(|term| term.to_lowercase())
        .collect();

    Ok(document.values().any(|value| match value {
        Bson::String(s) => {
            let lowered = s.to_lowercase();
            terms.iter().any(|term| lowered.contains(term.as_str()))
        }
        _ => false,
    }))
}

fn field_matches(document: &Document, field: &str, condition: &Bson) -> Result<bool, StoreError> {
    let stored = document.get(field);

    match condition {
        Bson::Document(spec) if is_operator_document(spec) => operator_matches(stored, spec),
        Bson::Document(spec) => match stored {
            // Plain sub-document conditions recurse, treating the embedded
            // document as its own match target.
            Some(Bson::Document(sub)) => matches(sub, spec),
            _ => Ok(false),
        },
        // $eq: null matches both missing fields and explicit nulls.
        Bson::Null => Ok(matches!(stored, None | Some(Bson::Null))),
        other => Ok(eq_with_arrays(stored, other)),
    }
}

fn is_operator_document(spec: &Document) -> bool {
    spec.keys().next().is_some_and(|key| key.starts_with('$'))
}

fn operator_matches(stored: Option<&Bson>, spec: &Document) -> Result<bool, StoreError> {
    // $regex consumes its $options sibling, so it handles the whole document.
    if spec.contains_key("$regex") {
        return regex_matches(stored, spec);
    }

    for (operator, operand) in spec {
        let hit = match operator.as_str() {
            "$eq" => match operand {
                Bson::Null => stored.is_none() || stored == Some(&Bson::Null),
                other => eq_with_arrays(stored, other),
            },
            "$ne" => !eq_with_arrays(stored, operand),
            "$gt" | "$gte" | "$lt" | "$lte" => {
                let predicate: fn(Ordering) -> bool = match operator.as_str() {
                    "$gt" => |o| o == Ordering::Greater,
                    "$gte" => |o| o != Ordering::Less,
                    "$lt" => |o| o == Ordering::Less,
                    _ => |o| o != Ordering::Greater,
                };
                cmp_with_arrays(stored, operand, predicate)
            }
            "$in" => in_matches(operator, stored, operand)?,
            "$nin" => !in_matches(operator, stored, operand)?,
            "$exists" => {
                let expected = exists_operand(operand)?;
                expected == stored.is_some()
            }
            "$not" => match operand {
                Bson::Document(inner) => !operator_matches(stored, inner)?,
                other => {
                    return Err(StoreError::InvalidFilter(format!(
                        "$not value must be an operator document, got {other}"
                    )));
                }
            },
            "$options" => {
                return Err(StoreError::InvalidFilter(
                    "$options without $regex".to_string(),
                ));
            }
            other => {
                return Err(StoreError::InvalidFilter(format!(
                    "unknown field operator: {other}"
                )));
            }
        };

        if !hit {
            return Ok(false);
        }
    }

    Ok(true)
}

fn regex_matches(stored: Option<&Bson>, spec: &Document) -> Result<bool, StoreError> {
    let mut pattern: Option<&str> = None;
    let mut options: Option<&str> = None;

    for (key, value) in spec {
        match (key.as_str(), value) {
            ("$regex", Bson::String(s)) => pattern = Some(s.as_str()),
            ("$options", Bson::String(s)) => options = Some(s.as_str()),
            ("$regex" | "$options", other) => {
                return Err(StoreError::InvalidFilter(format!(
                    "{key} value must be a string, got {other}"
                )));
            }
            (other, _) => {
                return Err(StoreError::InvalidFilter(format!(
                    "unexpected key alongside $regex: {other}"
                )));
            }
        }
    }

    let pattern = pattern
        .ok_or_else(|| StoreError::InvalidFilter("missing $regex pattern".to_string()))?;

    // Inline the flags rather than tracking them separately.
    let full_pattern = match options {
        Some(options) => {
            let mut prefixed = String::with_capacity(4 + options.len() + pattern.len());
            prefixed.push_str("(?");
            for flag in options.chars() {
                match flag {
                    'i' | 's' | 'm' | 'x' => prefixed.push(flag),
                    other => {
                        return Err(StoreError::InvalidFilter(format!(
                            "unknown regex option: {other}"
                        )));
                    }
                }
            }
            prefixed.push(')');
            prefixed.push_str(pattern);
            prefixed
        }
        None => pattern.to_string(),
    };

    let regex = Regex::new(&full_pattern)
        .map_err(|e| StoreError::InvalidFilter(format!("invalid regex pattern: {e}")))?;

    Ok(match stored {
        Some(Bson::String(s)) => regex.is_match(s),
        _ => false,
    })
}

fn in_matches(operator: &str, stored: Option<&Bson>, operand: &Bson) -> Result<bool, StoreError> {
    let Bson::Array(candidates) = operand else {
        return Err(StoreError::InvalidFilter(format!(
            "{operator} value must be an array"
        )));
    };

    Ok(candidates
        .iter()
        .any(|candidate| eq_with_arrays(stored, candidate)))
}

fn exists_operand(operand: &Bson) -> Result<bool, StoreError> {
    match operand {
        Bson::Boolean(b) => Ok(*b),
        Bson::String(s) if s == "true" => Ok(true),
        Bson::String(s) if s == "false" => Ok(false),
        other => Err(StoreError::InvalidFilter(format!(
            "$exists value must be a boolean, got {other}"
        ))),
    }
}

/// Implicit equality; a stored array matches when any element matches.
fn eq_with_arrays(stored: Option<&Bson>, query: &Bson) -> bool {
    match stored {
        Some(Bson::Array(items)) => items.iter().any(|item| value_eq(item, query)),
        Some(value) => value_eq(value, query),
        None => false,
    }
}

fn cmp_with_arrays(stored: Option<&Bson>, query: &Bson, predicate: fn(Ordering) -> bool) -> bool {
    match stored {
        Some(Bson::Array(items)) => items
            .iter()
            .any(|item| value_cmp(item, query).is_some_and(predicate)),
        Some(value) => value_cmp(value, query).is_some_and(predicate),
        None => false,
    }
}

/// Equality between a stored value and a query operand, coercing untyped
/// query strings toward the stored type.
fn value_eq(stored: &Bson, query: &Bson) -> bool {
    match (stored, query) {
        // numeric cross-type
        (Bson::Int32(a), Bson::Int64(b)) => i64::from(*a) == *b,
        (Bson::Int64(a), Bson::Int32(b)) => *a == i64::from(*b),
        (Bson::Int32(a), Bson::Double(b)) => f64::from(*a) == *b,
        (Bson::Int64(a), Bson::Double(b)) => (*a as f64) == *b,
        (Bson::Double(a), Bson::Int32(b)) => *a == f64::from(*b),
        (Bson::Double(a), Bson::Int64(b)) => *a == (*b as f64),

        // query strings coerce to the stored type
        (Bson::Int32(a), Bson::String(s)) => {
            s.parse::<i64>().is_ok_and(|b| i64::from(*a) == b)
        }
        (Bson::Int64(a), Bson::String(s)) => s.parse::<i64>().is_ok_and(|b| *a == b),
        (Bson::Double(a), Bson::String(s)) => s.parse::<f64>().is_ok_and(|b| *a == b),
        (Bson::Boolean(a), Bson::String(s)) => match s.as_str() {
            "true" => *a,
            "false" => !*a,
            _ => false,
        },
        (Bson::DateTime(a), Bson::String(s)) => {
            parse_datetime(s).is_some_and(|b| a.timestamp_millis() == b.timestamp_millis())
        }

        (a, b) => a == b,
    }
}

/// Ordering between a stored value and a query operand, with the same
/// string coercions as [`value_eq`]. `None` means the types are unordered.
fn value_cmp(stored: &Bson, query: &Bson) -> Option<Ordering> {
    match (stored, query) {
        (Bson::Int32(a), Bson::Int32(b)) => Some(a.cmp(b)),
        (Bson::Int32(a), Bson::Int64(b)) => Some(i64::from(*a).cmp(b)),
        (Bson::Int64(a), Bson::Int32(b)) => Some(a.cmp(&i64::from(*b))),
        (Bson::Int64(a), Bson::Int64(b)) => Some(a.cmp(b)),
        (Bson::Double(a), Bson::Double(b)) => a.partial_cmp(b),
        (Bson::Double(a), Bson::Int32(b)) => a.partial_cmp(&f64::from(*b)),
        (Bson::Double(a), Bson::Int64(b)) => a.partial_cmp(&(*b as f64)),
        (Bson::Int32(a), Bson::Double(b)) => f64::from(*a).partial_cmp(b),
        (Bson::Int64(a), Bson::Double(b)) => (*a as f64).partial_cmp(b),
        (Bson::String(a), Bson::String(b)) => Some(a.as_str().cmp(b.as_str())),
        (Bson::DateTime(a), Bson::DateTime(b)) => {
            Some(a.timestamp_millis().cmp(&b.timestamp_millis()))
        }

        (Bson::Int32(a), Bson::String(s)) => {
            s.parse::<i64>().map(|b| i64::from(*a).cmp(&b)).ok()
        }
        (Bson::Int64(a), Bson::String(s)) => s.parse::<i64>().map(|b| a.cmp(&b)).ok(),
        (Bson::Double(a), Bson::String(s)) => {
            s.parse::<f64>().ok().and_then(|b| a.partial_cmp(&b))
        }
        (Bson::DateTime(a), Bson::String(s)) => {
            parse_datetime(s).map(|b| a.timestamp_millis().cmp(&b.timestamp_millis()))
        }

        _ => None,
    }
}

/// Ordering used by the sort stage: a simplified BSON type order (missing,
/// null, numbers, strings, objects, arrays, ids, booleans, dates), values
/// compared within a type.
pub(crate) fn order_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let (ra, rb) = (type_rank(a), type_rank(b));
    if ra != rb {
        return ra.cmp(&rb);
    }

    let (Some(a), Some(b)) = (a, b) else {
        return Ordering::Equal;
    };

    match (a, b) {
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
        (Bson::DateTime(x), Bson::DateTime(y)) => {
            x.timestamp_millis().cmp(&y.timestamp_millis())
        }
        _ => value_cmp(a, b).unwrap_or(Ordering::Equal),
    }
}

fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        None => 0,
        Some(Bson::Null) => 1,
        Some(Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_)) => 2,
        Some(Bson::String(_)) => 3,
        Some(Bson::Document(_)) => 4,
        Some(Bson::Array(_)) => 5,
        Some(Bson::ObjectId(_)) => 6,
        Some(Bson::Boolean(_)) => 7,
        Some(Bson::DateTime(_)) => 8,
        Some(_) => 9,
    }
}
