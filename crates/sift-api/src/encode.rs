use bson::{Bson, Document};
use serde_json::{Map, Value};

/// Render a BSON document as plain JSON for a response body.
///
/// ObjectIds render as their hex string and datetimes as RFC-3339 at
/// second precision; responses never carry extended JSON.
pub fn document(document: &Document) -> Value {
    let mut map = Map::with_capacity(document.len());
    for (key, value) in document {
        map.insert(key.clone(), bson(value));
    }
    Value::Object(map)
}

pub fn bson(value: &Bson) -> Value {
    match value {
        Bson::Null => Value::Null,
        Bson::Boolean(v) => Value::Bool(*v),
        Bson::Int32(v) => Value::Number((*v).into()),
        Bson::Int64(v) => Value::Number((*v).into()),
        Bson::Double(v) => serde_json::Number::from_f64(*v)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Bson::String(v) => Value::String(v.clone()),
        Bson::Array(items) => Value::Array(items.iter().map(bson).collect()),
        Bson::Document(doc) => document(doc),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => Value::String(datetime(*dt)),
        other => Value::String(other.to_string()),
    }
}

fn datetime(dt: bson::DateTime) -> String {
    // Whole-second precision in responses.
    let truncated = bson::DateTime::from_millis(dt.timestamp_millis() / 1000 * 1000);
    truncated
        .try_to_rfc3339_string()
        .unwrap_or_else(|_| dt.timestamp_millis().to_string())
}
