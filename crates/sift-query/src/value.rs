use bson::Bson;
use bson::oid::ObjectId;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::QueryError;

/// Field name whose values coerce to the store-native identifier type.
pub const ID_FIELD: &str = "_id";

/// Coerce a raw string into a typed BSON value.
///
/// There is no schema — the type is inferred from the value itself by an
/// ordered chain of attempts, first match wins:
///
/// 1. identifier field → `ObjectId` (malformed input is an error)
/// 2. `"true"` / `"false"` → boolean
/// 3. ISO-8601 timestamp → UTC datetime
/// 4. decimal digits only → `i64`
/// 5. contains `.` and parses → `f64`
/// 6. anything else stays a plain string
///
/// Only applied to values the operator expander has ruled out as operator
/// expressions.
pub fn coerce(field: &str, value: &str) -> Result<Bson, QueryError> {
    if field == ID_FIELD && !value.is_empty() {
        return ObjectId::parse_str(value)
            .map(Bson::ObjectId)
            .map_err(|_| QueryError::InvalidIdentifier(value.to_string()));
    }

    Ok(coerce_bool(value)
        .or_else(|| coerce_datetime(value))
        .or_else(|| coerce_int(value))
        .or_else(|| coerce_float(value))
        .unwrap_or_else(|| Bson::String(value.to_string())))
}

fn coerce_bool(value: &str) -> Option<Bson> {
    match value {
        "true" => Some(Bson::Boolean(true)),
        "false" => Some(Bson::Boolean(false)),
        _ => None,
    }
}

fn coerce_datetime(value: &str) -> Option<Bson> {
    parse_datetime(value).map(Bson::DateTime)
}

fn coerce_int(value: &str) -> Option<Bson> {
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        value.parse::<i64>().ok().map(Bson::Int64)
    } else {
        None
    }
}

fn coerce_float(value: &str) -> Option<Bson> {
    if value.contains('.') {
        value.parse::<f64>().ok().map(Bson::Double)
    } else {
        None
    }
}

/// Parse a lenient ISO-8601 timestamp into a UTC BSON datetime.
///
/// Accepts a full RFC-3339 string with offset, a naive datetime with or
/// without seconds/subseconds (`2025-08-01T00:00`), or a bare date.
/// Naive inputs are taken as UTC.
pub fn parse_datetime(value: &str) -> Option<bson::DateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(bson::DateTime::from_millis(dt.timestamp_millis()));
    }

    const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(bson::DateTime::from_millis(naive.and_utc().timestamp_millis()));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(bson::DateTime::from_millis(midnight.and_utc().timestamp_millis()));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_field_parses_objectid() {
        let value = coerce(ID_FIELD, "abcdef0123456789abcdef01").unwrap();
        assert_eq!(
            value,
            Bson::ObjectId(ObjectId::parse_str("abcdef0123456789abcdef01").unwrap())
        );
    }

    #[test]
    fn id_field_rejects_malformed() {
        let err = coerce(ID_FIELD, "an invalid _id").unwrap_err();
        assert!(matches!(err, QueryError::InvalidIdentifier(_)));
    }

    #[test]
    fn id_field_empty_falls_through() {
        assert_eq!(coerce(ID_FIELD, "").unwrap(), Bson::String(String::new()));
    }

    #[test]
    fn booleans() {
        assert_eq!(coerce("field", "true").unwrap(), Bson::Boolean(true));
        assert_eq!(coerce("field", "false").unwrap(), Bson::Boolean(false));
    }

    #[test]
    fn datetime_without_seconds() {
        let value = coerce("field", "2025-08-01T00:00").unwrap();
        assert!(matches!(value, Bson::DateTime(_)));
    }

    #[test]
    fn datetime_rfc3339() {
        let value = coerce("field", "2025-08-01T12:30:00Z").unwrap();
        let expected = bson::DateTime::parse_rfc3339_str("2025-08-01T12:30:00Z").unwrap();
        assert_eq!(value, Bson::DateTime(expected));
    }

    #[test]
    fn date_only_is_midnight_utc() {
        let value = coerce("field", "2025-08-01").unwrap();
        let expected = bson::DateTime::parse_rfc3339_str("2025-08-01T00:00:00Z").unwrap();
        assert_eq!(value, Bson::DateTime(expected));
    }

    #[test]
    fn digits_become_int() {
        assert_eq!(coerce("field", "42").unwrap(), Bson::Int64(42));
    }

    #[test]
    fn decimal_becomes_float() {
        assert_eq!(coerce("field", "4.5").unwrap(), Bson::Double(4.5));
    }

    #[test]
    fn negative_int_stays_string() {
        // Only unsigned digit runs coerce to integers.
        assert_eq!(coerce("field", "-42").unwrap(), Bson::String("-42".into()));
    }

    #[test]
    fn plain_string_unchanged() {
        assert_eq!(coerce("field", "value").unwrap(), Bson::String("value".into()));
    }

    #[test]
    fn coercion_is_idempotent_for_plain_strings() {
        let first = coerce("field", "some plain value").unwrap();
        let Bson::String(s) = &first else {
            panic!("expected string");
        };
        assert_eq!(coerce("field", s).unwrap(), first);
    }
}
