/// In-memory document store adapter
///
/// Implements DocumentStorePort over a map of collections. Used by the CLI's
/// fixture mode and by tests that need real filtering and ordering.
use crate::domain::value::{Document, DocumentReference, Fields, Timestamp, Value};
use crate::error::{AppError, Result};
use crate::ports::document_store::{Direction, DocumentStorePort, Filter, Operator, Query};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::RwLock;

/// In-memory storage implementation
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Fields>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON fixture file.
    ///
    /// The fixture maps collection names to `{ id: fields }` objects. Field
    /// values are plain JSON except `{"$ref": "collection/id"}` for references
    /// and `{"$timestamp": "<RFC 3339>"}` for timestamps.
    pub fn from_fixture_file(path: &Path) -> Result<Self> {
        log::info!("Loading document fixture from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        let json: serde_json::Value = serde_json::from_str(&contents)?;
        Self::from_fixture(&json)
    }

    pub fn from_fixture(json: &serde_json::Value) -> Result<Self> {
        let collections = json
            .as_object()
            .ok_or_else(|| AppError::Store("fixture root must be an object".to_string()))?;

        let store = Self::new();
        for (collection, documents) in collections {
            let documents = documents.as_object().ok_or_else(|| {
                AppError::Store(format!("fixture collection '{}' must be an object", collection))
            })?;
            for (id, data) in documents {
                let fields = match value_from_fixture(data)? {
                    Value::Map(fields) => fields,
                    other => {
                        return Err(AppError::Store(format!(
                            "fixture document {}/{} must be an object, found {}",
                            collection,
                            id,
                            other.kind()
                        )))
                    }
                };
                store.insert(&DocumentReference::new(collection, id), fields);
            }
        }
        Ok(store)
    }

    /// Insert or replace a document
    pub fn insert(&self, reference: &DocumentReference, fields: Fields) {
        let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
        let collection_path = collection_path(reference);
        collections
            .entry(collection_path)
            .or_default()
            .insert(reference.id().to_string(), fields);
    }

    /// Number of documents in a collection
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(collection)
            .map_or(0, BTreeMap::len)
    }
}

/// Path of the collection containing `reference`, e.g. `event/e1/minutes`
fn collection_path(reference: &DocumentReference) -> String {
    let path = reference.path();
    match path.rfind('/') {
        Some(index) => path[..index].to_string(),
        None => String::new(),
    }
}

#[async_trait]
impl DocumentStorePort for MemoryStore {
    async fn run_query(&self, query: &Query) -> Result<Vec<Document>> {
        let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
        let Some(documents) = collections.get(&query.collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<Document> = documents
            .iter()
            .filter(|(_, fields)| query.filters.iter().all(|f| matches_filter(fields, f)))
            .filter(|(_, fields)| {
                query
                    .order_by
                    .iter()
                    .all(|o| fields.contains_key(&o.field))
            })
            .map(|(id, fields)| {
                Document::new(
                    DocumentReference::new(&query.collection, id),
                    fields.clone(),
                )
            })
            .collect();

        matched.sort_by(|a, b| {
            for order in &query.order_by {
                let ordering = match (a.fields.get(&order.field), b.fields.get(&order.field)) {
                    (Some(x), Some(y)) => compare_values(x, y),
                    _ => Ordering::Equal,
                };
                let ordering = match order.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            a.reference.cmp(&b.reference)
        });

        if let Some(count) = query.limit {
            matched.truncate(count as usize);
        }

        log::debug!("Memory query '{}' matched {} documents", query, matched.len());
        Ok(matched)
    }

    async fn get_document(&self, reference: &DocumentReference) -> Result<Option<Document>> {
        let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
        Ok(collections
            .get(&collection_path(reference))
            .and_then(|docs| docs.get(reference.id()))
            .map(|fields| Document::new(reference.clone(), fields.clone())))
    }
}

fn matches_filter(fields: &Fields, filter: &Filter) -> bool {
    let Some(value) = fields.get(&filter.field) else {
        return false;
    };
    match filter.op {
        Operator::Equal => values_equal(value, &filter.value),
        Operator::NotEqual => *value != Value::Null && !values_equal(value, &filter.value),
        Operator::LessThan => same_kind(value, &filter.value)
            && compare_values(value, &filter.value) == Ordering::Less,
        Operator::LessThanOrEqual => same_kind(value, &filter.value)
            && compare_values(value, &filter.value) != Ordering::Greater,
        Operator::GreaterThan => same_kind(value, &filter.value)
            && compare_values(value, &filter.value) == Ordering::Greater,
        Operator::GreaterThanOrEqual => same_kind(value, &filter.value)
            && compare_values(value, &filter.value) != Ordering::Less,
        Operator::In => match &filter.value {
            Value::Array(candidates) => candidates.iter().any(|c| values_equal(value, c)),
            _ => false,
        },
        Operator::ArrayContains => match value {
            Value::Array(items) => items.iter().any(|i| values_equal(i, &filter.value)),
            _ => false,
        },
    }
}

/// Position of a value's type in the store's cross-type ordering
fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Boolean(_) => 1,
        Value::Integer(_) | Value::Double(_) => 2,
        Value::Timestamp(_) => 3,
        Value::String(_) => 4,
        Value::Bytes(_) => 5,
        Value::Reference(_) => 6,
        Value::GeoPoint { .. } => 7,
        Value::Array(_) => 8,
        Value::Map(_) => 9,
    }
}

fn same_kind(a: &Value, b: &Value) -> bool {
    type_rank(a) == type_rank(b)
}

fn values_equal(a: &Value, b: &Value) -> bool {
    same_kind(a, b) && compare_values(a, b) == Ordering::Equal
}

/// Total order over values: by type first, then within the type
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bytes(x), Value::Bytes(y)) => x.cmp(y),
        (Value::Reference(x), Value::Reference(y)) => x.cmp(y),
        (
            Value::GeoPoint {
                latitude: lat_a,
                longitude: lng_a,
            },
            Value::GeoPoint {
                latitude: lat_b,
                longitude: lng_b,
            },
        ) => lat_a
            .partial_cmp(lat_b)
            .unwrap_or(Ordering::Equal)
            .then_with(|| lng_a.partial_cmp(lng_b).unwrap_or(Ordering::Equal)),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(i, j)| compare_values(i, j))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        (Value::Map(x), Value::Map(y)) => x
            .iter()
            .zip(y.iter())
            .map(|((ka, va), (kb, vb))| ka.cmp(kb).then_with(|| compare_values(va, vb)))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => type_rank(a).cmp(&type_rank(b)),
        },
    }
}

/// Converts a fixture JSON value, honouring the `$ref` and `$timestamp` tags
pub fn value_from_fixture(json: &serde_json::Value) -> Result<Value> {
    Ok(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::Array(
            items
                .iter()
                .map(value_from_fixture)
                .collect::<Result<Vec<_>>>()?,
        ),
        serde_json::Value::Object(map) => {
            if map.len() == 1 {
                if let Some(path) = map.get("$ref").and_then(|v| v.as_str()) {
                    return Ok(Value::Reference(DocumentReference::from_path(path)?));
                }
                if let Some(ts) = map.get("$timestamp").and_then(|v| v.as_str()) {
                    return Ok(Value::Timestamp(Timestamp::parse_rfc3339(ts)?));
                }
            }
            let mut fields = Fields::new();
            for (key, value) in map {
                fields.insert(key.clone(), value_from_fixture(value)?);
            }
            Value::Map(fields)
        }
    })
}
