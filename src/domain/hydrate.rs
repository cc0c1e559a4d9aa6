//! Field extraction helpers shared by the model constructors
//!
//! Every helper follows the same rule: a field is only read when the key is
//! present and not null. Wrong-typed scalars are skipped, wrong-typed dates
//! are an error.

use crate::domain::value::{Fields, Value};
use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A model that can be constructed from raw document fields
pub trait Model: Sized {
    /// Builds the model from a document's fields (with `id` merged in)
    fn from_fields(fields: &Fields) -> Result<Self>;

    /// Raw field names this instance holds a value for
    fn defined_fields(&self) -> Vec<&'static str>;
}

/// A reference field: either the id of the target document or the target
/// hydrated in place. Never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Id(String),
    Hydrated(Box<T>),
}

impl<T> Ref<T> {
    /// Id when the field was a bare pointer
    pub fn id(&self) -> Option<&str> {
        match self {
            Ref::Id(id) => Some(id),
            Ref::Hydrated(_) => None,
        }
    }

    /// Nested model when the field was an inline document
    pub fn model(&self) -> Option<&T> {
        match self {
            Ref::Id(_) => None,
            Ref::Hydrated(model) => Some(model),
        }
    }

    pub fn is_hydrated(&self) -> bool {
        matches!(self, Ref::Hydrated(_))
    }
}

/// Value under `key` unless it is missing or null
pub fn present<'a>(fields: &'a Fields, key: &str) -> Option<&'a Value> {
    match fields.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

fn skip<T>(key: &str, expected: &str, value: &Value) -> Option<T> {
    log::debug!(
        "Skipping field '{}': expected {}, found {}",
        key,
        expected,
        value.kind()
    );
    None
}

pub fn string_field(fields: &Fields, key: &str) -> Option<String> {
    let value = present(fields, key)?;
    match value.as_str() {
        Some(s) => Some(s.to_string()),
        None => skip(key, "string", value),
    }
}

pub fn number_field(fields: &Fields, key: &str) -> Option<f64> {
    let value = present(fields, key)?;
    match value.as_f64() {
        Some(n) => Some(n),
        None => skip(key, "number", value),
    }
}

pub fn integer_field(fields: &Fields, key: &str) -> Option<i64> {
    let value = present(fields, key)?;
    match value {
        Value::Integer(i) => Some(*i),
        Value::Double(d) => whole_number(*d).or_else(|| skip(key, "integer", value)),
        _ => skip(key, "integer", value),
    }
}

/// `d` as an integer when it is whole and fits in an i64
fn whole_number(d: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if d.fract() == 0.0 && d >= i64::MIN as f64 && d < i64::MAX as f64 {
        Some(d as i64)
    } else {
        None
    }
}

pub fn bool_field(fields: &Fields, key: &str) -> Option<bool> {
    let value = present(fields, key)?;
    match value {
        Value::Boolean(b) => Some(*b),
        _ => skip(key, "boolean", value),
    }
}

/// Reads a date field. A present value that is not a timestamp is an error.
pub fn datetime_field(fields: &Fields, key: &str) -> Result<Option<DateTime<Utc>>> {
    match present(fields, key) {
        Some(value) => timestamp_to_datetime(value)
            .map(Some)
            .map_err(|e| AppError::InvalidTimestamp(format!("field '{}': {}", key, e))),
        None => Ok(None),
    }
}

/// Converts a store timestamp to a UTC date.
///
/// Accepts the native timestamp and its serialized map form
/// `{ "seconds": .., "nanoseconds": .. }`.
pub fn timestamp_to_datetime(value: &Value) -> Result<DateTime<Utc>> {
    match value {
        Value::Timestamp(ts) => ts.to_datetime(),
        Value::Map(map) => {
            let seconds = match map.get("seconds") {
                Some(Value::Integer(s)) => Some(*s),
                Some(Value::Double(s)) => whole_number(*s),
                _ => None,
            }
            .ok_or_else(|| {
                AppError::InvalidTimestamp("map is missing integer 'seconds'".to_string())
            })?;
            let nanos = match map.get("nanoseconds") {
                None => 0,
                Some(Value::Integer(n)) if (0..1_000_000_000).contains(n) => *n as u32,
                Some(other) => {
                    return Err(AppError::InvalidTimestamp(format!(
                        "invalid 'nanoseconds' of type {}",
                        other.kind()
                    )))
                }
            };
            DateTime::from_timestamp(seconds, nanos).ok_or_else(|| {
                AppError::InvalidTimestamp(format!("{}s {}ns is out of range", seconds, nanos))
            })
        }
        other => Err(AppError::InvalidTimestamp(format!(
            "expected timestamp, found {}",
            other.kind()
        ))),
    }
}

/// Classifies a reference field by its runtime shape: a pointer keeps the
/// target id, an inline document is hydrated into `T`. Other shapes leave
/// the field unset.
pub fn reference_field<T: Model>(fields: &Fields, key: &str) -> Result<Option<Ref<T>>> {
    let Some(value) = present(fields, key) else {
        return Ok(None);
    };
    match value {
        Value::Reference(reference) => Ok(Some(Ref::Id(reference.id().to_string()))),
        Value::Map(inner) => Ok(Some(Ref::Hydrated(Box::new(T::from_fields(inner)?)))),
        other => Ok(skip(key, "reference or document", other)),
    }
}
