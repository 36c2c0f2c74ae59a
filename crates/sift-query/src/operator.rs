use bson::{Bson, Document, doc};

use crate::error::QueryError;
use crate::value::{coerce, parse_datetime};

/// Marker prefix for nested-field keys: `$.outer.inner` redirects the value
/// into a sub-document keyed by the inner path.
const NESTED_MARKER: &str = "$.";

/// The expanded value, tagged by whether the operator table recognized it.
///
/// The expander itself never decides what to do with an unknown operator —
/// `Unrecognized` carries the raw, unsplit value so the caller can choose a
/// strict (reject) or lenient (pass through) policy.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpandedValue {
    Recognized(Bson),
    Unrecognized(Bson),
}

impl ExpandedValue {
    pub fn into_bson(self) -> Bson {
        match self {
            ExpandedValue::Recognized(value) | ExpandedValue::Unrecognized(value) => value,
        }
    }

    pub fn as_bson(&self) -> &Bson {
        match self {
            ExpandedValue::Recognized(value) | ExpandedValue::Unrecognized(value) => value,
        }
    }

    pub fn is_unrecognized(&self) -> bool {
        matches!(self, ExpandedValue::Unrecognized(_))
    }
}

/// One expanded `(field, value)` pair. Expansion may rewrite the field key
/// itself — logical operators collapse onto `$and`/`$or`/`$nor`, and
/// `$text`/`$search` collapse onto `$text`.
#[derive(Debug, Clone, PartialEq)]
pub struct Expanded {
    pub field: String,
    pub value: ExpandedValue,
}

impl Expanded {
    fn recognized(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Expanded {
            field: field.into(),
            value: ExpandedValue::Recognized(value.into()),
        }
    }
}

/// Expand one raw `(field, value)` pair into a query clause.
///
/// Plain values are delegated to the value coercer; values starting with the
/// `$` sentinel are interpreted as `$operator:payload` expressions. A payload
/// of exactly `$now` is replaced with the current UTC time before the
/// operator is applied.
pub fn expand(field: &str, value: &Bson) -> Result<Expanded, QueryError> {
    // Nested-field syntax wraps the expansion of the inner path. The marker
    // is re-applied while dots remain, so `$.a.b.c` nests twice.
    if let Some(path) = field.strip_prefix(NESTED_MARKER) {
        if let Some((outer, inner)) = path.split_once('.') {
            let inner_key = if inner.contains('.') {
                format!("{NESTED_MARKER}{inner}")
            } else {
                inner.to_string()
            };
            let expanded = expand(&inner_key, value)?;
            let mut wrapped = Document::new();
            wrapped.insert(expanded.field, expanded.value.into_bson());
            return Ok(Expanded::recognized(outer, wrapped));
        }
    }

    // Defaults arrive as typed BSON; only strings carry the micro-language.
    let coerced = match value {
        Bson::String(s) => coerce(field, s)?,
        other => return Ok(Expanded::recognized(field, other.clone())),
    };

    match coerced {
        Bson::String(s) if s.starts_with('$') => expand_operator(field, &s),
        done => Ok(Expanded::recognized(field, done)),
    }
}

/// Operator payload after `$now` substitution.
enum Payload<'a> {
    Text(&'a str),
    Now(bson::DateTime),
}

impl Payload<'_> {
    fn to_bson(&self) -> Bson {
        match self {
            Payload::Text(s) => Bson::String((*s).to_string()),
            Payload::Now(dt) => Bson::DateTime(*dt),
        }
    }

    /// The payload as text, for operators that must split it further.
    fn text(&self, operator: &str) -> Result<&str, QueryError> {
        match self {
            Payload::Text(s) => Ok(*s),
            Payload::Now(_) => Err(QueryError::MalformedOperatorValue(format!(
                "{operator} cannot split a datetime payload"
            ))),
        }
    }
}

fn expand_operator(field: &str, raw: &str) -> Result<Expanded, QueryError> {
    let Some((operator, payload)) = raw.split_once(':') else {
        return Err(QueryError::MalformedOperatorValue(format!(
            "missing payload in {raw:?}"
        )));
    };

    let payload = if payload == "$now" {
        Payload::Now(bson::DateTime::now())
    } else {
        Payload::Text(payload)
    };

    match operator {
        "$between" => {
            let text = payload.text(operator)?;
            let Some((from, to)) = text.split_once(',') else {
                return Err(QueryError::MalformedOperatorValue(format!(
                    "$between expects two comma-separated timestamps, got {text:?}"
                )));
            };
            let from = parse_timestamp(from)?;
            let to = parse_timestamp(to)?;
            Ok(Expanded::recognized(
                field,
                doc! { "$gte": from, "$lte": to },
            ))
        }
        "$list" => {
            let items = split_items(payload.text(operator)?);
            Ok(Expanded::recognized(field, Bson::Array(items)))
        }
        "$eq" | "$gt" | "$gte" | "$lt" | "$lte" | "$ne" => {
            let mut clause = Document::new();
            clause.insert(operator, payload.to_bson());
            Ok(Expanded::recognized(field, clause))
        }
        "$in" | "$nin" => {
            let mut clause = Document::new();
            clause.insert(operator, split_items(payload.text(operator)?));
            Ok(Expanded::recognized(field, clause))
        }
        "$and" | "$only" => logical(field, "$and", &payload),
        "$or" | "$any" => logical(field, "$or", &payload),
        "$nor" => logical(field, "$nor", &payload),
        "$not" => {
            let text = payload.text(operator)?;
            let Some((inner_operator, inner_payload)) = text.split_once(':') else {
                return Err(QueryError::MalformedOperatorValue(format!(
                    "$not expects an inner operator expression, got {text:?}"
                )));
            };
            // The inner payload is deliberately not re-expanded.
            let mut inner = Document::new();
            inner.insert(inner_operator, inner_payload);
            Ok(Expanded::recognized(field, doc! { "$not": inner }))
        }
        "$exists" => {
            let mut clause = Document::new();
            clause.insert("$exists", payload.to_bson());
            Ok(Expanded::recognized(field, clause))
        }
        "$regex" => {
            let pattern = payload.text(operator)?;
            Ok(Expanded::recognized(
                field,
                doc! { "$regex": pattern, "$options": "i" },
            ))
        }
        "$text" | "$search" => {
            // Query strings arrive with `+` for spaces.
            let search = payload.text(operator)?.replace('+', " ");
            Ok(Expanded::recognized("$text", doc! { "$search": search }))
        }
        _ => Ok(Expanded {
            field: field.to_string(),
            value: ExpandedValue::Unrecognized(Bson::String(raw.to_string())),
        }),
    }
}

/// Logical operators rewrite the field key itself: each comma-separated item
/// becomes a `{field: item}` clause in the operator's array.
fn logical(field: &str, target: &str, payload: &Payload<'_>) -> Result<Expanded, QueryError> {
    let clauses = payload
        .text(target)?
        .split(',')
        .map(|item| {
            let mut clause = Document::new();
            clause.insert(field, item);
            Bson::Document(clause)
        })
        .collect::<Vec<_>>();
    Ok(Expanded::recognized(target, Bson::Array(clauses)))
}

fn split_items(text: &str) -> Vec<Bson> {
    text.split(',')
        .map(|item| Bson::String(item.to_string()))
        .collect()
}

fn parse_timestamp(text: &str) -> Result<bson::DateTime, QueryError> {
    parse_datetime(text).ok_or_else(|| {
        QueryError::MalformedOperatorValue(format!("unparseable timestamp {text:?}"))
    })
}
