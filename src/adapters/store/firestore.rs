//! Firestore REST adapter
//!
//! Implements the DocumentStorePort against the Firestore v1 REST API:
//! `documents:runQuery` for queries and a plain GET for single documents.

use crate::config::FirebaseConfig;
use crate::domain::value::{Document, DocumentReference, Fields, Timestamp, Value};
use crate::error::{AppError, Result};
use crate::ports::document_store::{Direction, DocumentStorePort, Filter, Operator, Query};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map};
use std::time::Duration;

/// Firestore service implementation
pub struct FirestoreStore {
    client: Client,
    config: FirebaseConfig,
}

impl FirestoreStore {
    /// Create a new Firestore store for the configured project
    pub fn new(config: FirebaseConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn documents_url(&self) -> String {
        format!("{}/{}", self.config.base_url, self.config.documents_root())
    }

    fn with_key(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.query(&[("key", key)]),
            None => request,
        }
    }

    /// Full resource name of a document
    fn resource_name(&self, reference: &DocumentReference) -> String {
        format!("{}/{}", self.config.documents_root(), reference.path())
    }

    /// Split a collection path into the query parent and collection id,
    /// e.g. `event/e1/minutes` -> (`.../documents/event/e1`, `minutes`)
    fn query_target(&self, collection: &str) -> (String, String) {
        match collection.rsplit_once('/') {
            Some((parent, id)) => (format!("{}/{}", self.documents_url(), parent), id.to_string()),
            None => (self.documents_url(), collection.to_string()),
        }
    }

    /// Turn a non-success response into a store error
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let error_text = response.text().await.unwrap_or_default();
        log::error!("Firestore API error ({}): {}", status, error_text);
        Err(AppError::Store(format!(
            "Firestore API error ({}): {}",
            status, error_text
        )))
    }
}

#[async_trait]
impl DocumentStorePort for FirestoreStore {
    async fn run_query(&self, query: &Query) -> Result<Vec<Document>> {
        let (parent, collection_id) = self.query_target(&query.collection);
        let url = format!("{}:runQuery", parent);
        let body = json!({ "structuredQuery": structured_query(query, &collection_id, &self.config)? });

        log::info!("Running Firestore query: {}", query);

        let response = self
            .with_key(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                log::error!("Firestore HTTP request failed: {}", e);
                AppError::Http(e)
            })?;
        let response = Self::check_status(response).await?;

        let items: Vec<RunQueryItem> = response.json().await?;
        let documents = items
            .into_iter()
            .filter_map(|item| item.document)
            .map(decode_document)
            .collect::<Result<Vec<_>>>()?;

        log::debug!("Firestore query returned {} documents", documents.len());
        Ok(documents)
    }

    async fn get_document(&self, reference: &DocumentReference) -> Result<Option<Document>> {
        let url = format!("{}/{}", self.config.base_url, self.resource_name(reference));

        let response = self
            .with_key(self.client.get(&url))
            .send()
            .await
            .map_err(|e| {
                log::error!("Firestore HTTP request failed: {}", e);
                AppError::Http(e)
            })?;
        if response.status() == StatusCode::NOT_FOUND {
            log::debug!("Firestore document {} not found", reference);
            return Ok(None);
        }
        let response = Self::check_status(response).await?;

        let document: RestDocument = response.json().await?;
        decode_document(document).map(Some)
    }
}

// ===== API Types =====

/// One element of the runQuery response stream
#[derive(Debug, Deserialize)]
struct RunQueryItem {
    document: Option<RestDocument>,
}

#[derive(Debug, Deserialize)]
struct RestDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, serde_json::Value>,
}

fn decode_document(document: RestDocument) -> Result<Document> {
    let reference = reference_from_resource_name(&document.name)?;
    let fields = decode_fields(&document.fields)?;
    Ok(Document::new(reference, fields))
}

fn decode_fields(fields: &Map<String, serde_json::Value>) -> Result<Fields> {
    fields
        .iter()
        .map(|(key, value)| Ok::<_, AppError>((key.clone(), decode_value(value)?)))
        .collect()
}

/// Strips `projects/<p>/databases/<d>/documents/` from a resource name
fn reference_from_resource_name(name: &str) -> Result<DocumentReference> {
    let (_, path) = name.split_once("/documents/").ok_or_else(|| {
        AppError::Store(format!("unexpected document resource name '{}'", name))
    })?;
    DocumentReference::from_path(path)
}

/// Decodes a typed REST value such as `{"stringValue": "x"}`
fn decode_value(value: &serde_json::Value) -> Result<Value> {
    let object = value
        .as_object()
        .ok_or_else(|| AppError::Store(format!("malformed Firestore value: {}", value)))?;
    let (kind, inner) = object
        .iter()
        .next()
        .ok_or_else(|| AppError::Store("empty Firestore value".to_string()))?;

    let malformed = || AppError::Store(format!("malformed Firestore {}: {}", kind, inner));

    Ok(match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => Value::Boolean(inner.as_bool().ok_or_else(malformed)?),
        // int64 values are transported as decimal strings
        "integerValue" => match inner {
            serde_json::Value::String(s) => Value::Integer(s.parse().map_err(|_| malformed())?),
            other => Value::Integer(other.as_i64().ok_or_else(malformed)?),
        },
        "doubleValue" => match inner {
            serde_json::Value::String(s) => match s.as_str() {
                "NaN" => Value::Double(f64::NAN),
                "Infinity" => Value::Double(f64::INFINITY),
                "-Infinity" => Value::Double(f64::NEG_INFINITY),
                _ => return Err(malformed()),
            },
            other => Value::Double(other.as_f64().ok_or_else(malformed)?),
        },
        "stringValue" => Value::String(inner.as_str().ok_or_else(malformed)?.to_string()),
        "timestampValue" => {
            Value::Timestamp(Timestamp::parse_rfc3339(inner.as_str().ok_or_else(malformed)?)?)
        }
        "bytesValue" => Value::Bytes(inner.as_str().ok_or_else(malformed)?.to_string()),
        // zero coordinates are omitted from the payload
        "geoPointValue" => {
            let coordinate = |name: &str| match inner.get(name) {
                None => Ok(0.0),
                Some(value) => value.as_f64().ok_or_else(malformed),
            };
            Value::GeoPoint {
                latitude: coordinate("latitude")?,
                longitude: coordinate("longitude")?,
            }
        }
        "referenceValue" => Value::Reference(reference_from_resource_name(
            inner.as_str().ok_or_else(malformed)?,
        )?),
        "mapValue" => match inner.get("fields").and_then(|f| f.as_object()) {
            Some(fields) => Value::Map(decode_fields(fields)?),
            None => Value::Map(Fields::new()),
        },
        "arrayValue" => match inner.get("values").and_then(|v| v.as_array()) {
            Some(values) => Value::Array(values.iter().map(decode_value).collect::<Result<_>>()?),
            None => Value::Array(Vec::new()),
        },
        other => {
            return Err(AppError::Store(format!(
                "unsupported Firestore value type '{}'",
                other
            )))
        }
    })
}

/// Encodes a value in the REST representation
fn encode_value(value: &Value, config: &FirebaseConfig) -> Result<serde_json::Value> {
    Ok(match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Boolean(b) => json!({ "booleanValue": b }),
        Value::Integer(i) => json!({ "integerValue": i.to_string() }),
        Value::Double(d) if d.is_nan() => json!({ "doubleValue": "NaN" }),
        Value::Double(d) if d.is_infinite() => json!({
            "doubleValue": if d.is_sign_positive() { "Infinity" } else { "-Infinity" }
        }),
        Value::Double(d) => json!({ "doubleValue": d }),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Timestamp(ts) => json!({ "timestampValue": ts.to_rfc3339()? }),
        Value::Bytes(b) => json!({ "bytesValue": b }),
        Value::GeoPoint {
            latitude,
            longitude,
        } => json!({ "geoPointValue": { "latitude": latitude, "longitude": longitude } }),
        Value::Reference(reference) => json!({
            "referenceValue": format!("{}/{}", config.documents_root(), reference.path())
        }),
        Value::Map(fields) => {
            let mut encoded = Map::new();
            for (key, value) in fields {
                encoded.insert(key.clone(), encode_value(value, config)?);
            }
            json!({ "mapValue": { "fields": encoded } })
        }
        Value::Array(values) => {
            let encoded = values
                .iter()
                .map(|v| encode_value(v, config))
                .collect::<Result<Vec<_>>>()?;
            json!({ "arrayValue": { "values": encoded } })
        }
    })
}

fn operator_name(op: Operator) -> &'static str {
    match op {
        Operator::Equal => "EQUAL",
        Operator::NotEqual => "NOT_EQUAL",
        Operator::LessThan => "LESS_THAN",
        Operator::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
        Operator::GreaterThan => "GREATER_THAN",
        Operator::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
        Operator::In => "IN",
        Operator::ArrayContains => "ARRAY_CONTAINS",
    }
}

fn field_filter(filter: &Filter, config: &FirebaseConfig) -> Result<serde_json::Value> {
    Ok(json!({
        "fieldFilter": {
            "field": { "fieldPath": filter.field },
            "op": operator_name(filter.op),
            "value": encode_value(&filter.value, config)?,
        }
    }))
}

/// Builds the `structuredQuery` body for a query
fn structured_query(
    query: &Query,
    collection_id: &str,
    config: &FirebaseConfig,
) -> Result<serde_json::Value> {
    let mut structured = Map::new();
    structured.insert(
        "from".to_string(),
        json!([{ "collectionId": collection_id }]),
    );

    match query.filters.as_slice() {
        [] => {}
        [single] => {
            structured.insert("where".to_string(), field_filter(single, config)?);
        }
        filters => {
            let encoded = filters
                .iter()
                .map(|f| field_filter(f, config))
                .collect::<Result<Vec<_>>>()?;
            structured.insert(
                "where".to_string(),
                json!({ "compositeFilter": { "op": "AND", "filters": encoded } }),
            );
        }
    }

    if !query.order_by.is_empty() {
        let orders: Vec<serde_json::Value> = query
            .order_by
            .iter()
            .map(|o| {
                json!({
                    "field": { "fieldPath": o.field },
                    "direction": match o.direction {
                        Direction::Ascending => "ASCENDING",
                        Direction::Descending => "DESCENDING",
                    },
                })
            })
            .collect();
        structured.insert("orderBy".to_string(), json!(orders));
    }

    if let Some(count) = query.limit {
        structured.insert("limit".to_string(), json!(count));
    }

    Ok(serde_json::Value::Object(structured))
}
