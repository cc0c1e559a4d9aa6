//! Raw document representation
//!
//! These types mirror what the document store hands back: a map of field
//! names to loosely typed values, where a value may be a native timestamp or
//! a pointer to another document.

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Field name to value map of a single document
pub type Fields = BTreeMap<String, Value>;

/// A raw field value as stored in the document store
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Timestamp(Timestamp),
    /// Base64 encoded, as transported
    Bytes(String),
    Reference(DocumentReference),
    GeoPoint { latitude: f64, longitude: f64 },
    Map(Fields),
    Array(Vec<Value>),
}

impl Value {
    /// Numeric view of the value; integers widen to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Short type name used in log and error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Timestamp(_) => "timestamp",
            Value::Bytes(_) => "bytes",
            Value::Reference(_) => "reference",
            Value::GeoPoint { .. } => "geo point",
            Value::Map(_) => "map",
            Value::Array(_) => "array",
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<DocumentReference> for Value {
    fn from(value: DocumentReference) -> Self {
        Value::Reference(value)
    }
}

impl From<Timestamp> for Value {
    fn from(value: Timestamp) -> Self {
        Value::Timestamp(value)
    }
}

impl From<Fields> for Value {
    fn from(value: Fields) -> Self {
        Value::Map(value)
    }
}

/// The store's native timestamp: seconds since the epoch plus nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl Timestamp {
    pub fn new(seconds: i64, nanos: u32) -> Self {
        Self { seconds, nanos }
    }

    /// Converts to a UTC date, failing for out-of-range values
    pub fn to_datetime(&self) -> Result<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanos).ok_or_else(|| {
            AppError::InvalidTimestamp(format!(
                "{}s {}ns is out of range",
                self.seconds, self.nanos
            ))
        })
    }

    /// Parses an RFC 3339 string such as `2021-03-01T17:00:00Z`
    pub fn parse_rfc3339(s: &str) -> Result<Self> {
        let parsed = DateTime::parse_from_rfc3339(s)
            .map_err(|e| AppError::InvalidTimestamp(format!("{}: {}", s, e)))?;
        Ok(Self::from(parsed.with_timezone(&Utc)))
    }

    pub fn to_rfc3339(&self) -> Result<String> {
        Ok(self
            .to_datetime()?
            .to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self {
            seconds: value.timestamp(),
            nanos: value.timestamp_subsec_nanos(),
        }
    }
}

/// A pointer to another document, e.g. `session/abc123`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentReference {
    path: String,
}

impl DocumentReference {
    /// Reference to a top-level document
    pub fn new(collection: &str, id: &str) -> Self {
        Self {
            path: format!("{}/{}", collection, id),
        }
    }

    /// Builds a reference from a slash separated path relative to the
    /// database root. The path must name a document, not a collection.
    pub fn from_path(path: &str) -> Result<Self> {
        let trimmed = path.trim_matches('/');
        let segments: Vec<&str> = trimmed.split('/').collect();
        if segments.len() < 2 || segments.len() % 2 != 0 || segments.iter().any(|s| s.is_empty())
        {
            return Err(AppError::Store(format!(
                "'{}' is not a document path",
                path
            )));
        }
        Ok(Self {
            path: trimmed.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Id of the referenced document (last path segment)
    pub fn id(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Collection that directly contains the referenced document
    pub fn collection(&self) -> &str {
        let mut segments = self.path.rsplit('/');
        segments.next();
        segments.next().unwrap_or_default()
    }
}

impl std::fmt::Display for DocumentReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// One document snapshot returned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub reference: DocumentReference,
    pub fields: Fields,
}

impl Document {
    pub fn new(reference: DocumentReference, fields: Fields) -> Self {
        Self { reference, fields }
    }

    pub fn id(&self) -> &str {
        self.reference.id()
    }

    /// The document's fields with its id merged in under `id`, which is the
    /// shape model constructors consume
    pub fn into_data(self) -> Fields {
        let id = self.reference.id().to_string();
        let mut fields = self.fields;
        fields.insert("id".to_string(), Value::String(id));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_accessors() {
        let reference = DocumentReference::new("session", "abc");
        assert_eq!(reference.path(), "session/abc");
        assert_eq!(reference.collection(), "session");
        assert_eq!(reference.id(), "abc");
    }

    #[test]
    fn test_reference_nested_path() {
        let reference = DocumentReference::from_path("/event/e1/minutes/m2").unwrap();
        assert_eq!(reference.collection(), "minutes");
        assert_eq!(reference.id(), "m2");
    }

    #[test]
    fn test_reference_rejects_collection_path() {
        assert!(DocumentReference::from_path("event").is_err());
        assert!(DocumentReference::from_path("event/e1/minutes").is_err());
        assert!(DocumentReference::from_path("event//x").is_err());
    }

    #[test]
    fn test_timestamp_rfc3339() {
        let ts = Timestamp::parse_rfc3339("2021-03-01T17:30:00.250Z").unwrap();
        assert_eq!(ts.seconds, 1_614_619_800);
        assert_eq!(ts.nanos, 250_000_000);
        assert_eq!(ts.to_rfc3339().unwrap(), "2021-03-01T17:30:00.250Z");
    }

    #[test]
    fn test_timestamp_out_of_range() {
        let ts = Timestamp::new(i64::MAX, 0);
        assert!(matches!(
            ts.to_datetime(),
            Err(AppError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_into_data_adds_id() {
        let mut fields = Fields::new();
        fields.insert("name".to_string(), Value::from("Council"));
        let doc = Document::new(DocumentReference::new("body", "b1"), fields);
        let data = doc.into_data();
        assert_eq!(data.get("id"), Some(&Value::from("b1")));
        assert_eq!(data.get("name"), Some(&Value::from("Council")));
    }
}
