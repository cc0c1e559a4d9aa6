//! Shared base service
//!
//! Runs queries for one collection through the document store port, resolves
//! requested references, and hydrates every returned document into a model.
//! Store errors are passed through untouched; the call site tag only goes to
//! the log.

use crate::domain::hydrate::Model;
use crate::domain::value::{Document, DocumentReference, Fields, Value};
use crate::error::Result;
use crate::ports::document_store::{DocumentStorePort, Query, QueryConstraint};
use crate::services::collections::CollectionName;
use futures_util::future::{try_join_all, BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;

/// Population options nested deeper than this are skipped
pub const MAX_POPULATE_DEPTH: usize = 4;

/// A reference field to resolve before hydration
#[derive(Debug, Clone, PartialEq)]
pub struct Populate {
    /// Collection the reference points into
    pub collection: CollectionName,
    /// Field holding the reference
    pub ref_name: String,
    /// References to resolve inside the fetched document
    pub nested: Vec<Populate>,
}

impl Populate {
    pub fn new(collection: CollectionName, ref_name: &str) -> Self {
        Self {
            collection,
            ref_name: ref_name.to_string(),
            nested: Vec::new(),
        }
    }

    /// Adds nested population options (builder pattern)
    pub fn with_nested(mut self, nested: Vec<Populate>) -> Self {
        self.nested = nested;
        self
    }
}

/// Base service bound to a single collection
#[derive(Clone)]
pub struct ModelService {
    collection: CollectionName,
    store: Arc<dyn DocumentStorePort>,
}

impl ModelService {
    pub fn new(collection: CollectionName, store: Arc<dyn DocumentStorePort>) -> Self {
        Self { collection, store }
    }

    pub fn collection(&self) -> CollectionName {
        self.collection
    }

    /// Reference to a document of this service's collection
    pub fn reference(&self, id: &str) -> DocumentReference {
        DocumentReference::new(self.collection.as_str(), id)
    }

    /// Query this collection, then resolve `populate` on every result
    pub async fn get_documents(
        &self,
        constraints: Vec<QueryConstraint>,
        populate: &[Populate],
    ) -> Result<Vec<Document>> {
        let query = Query::new(self.collection.as_str(), constraints);
        let documents = self.store.run_query(&query).await?;
        if populate.is_empty() {
            return Ok(documents);
        }

        let store = self.store.as_ref();
        try_join_all(documents.into_iter().map(|document| async move {
            let Document { reference, fields } = document;
            let fields = populate_fields(store, fields, populate, 0).await?;
            Ok::<_, crate::error::AppError>(Document::new(reference, fields))
        }))
        .await
    }

    /// Fetch one document of this collection by id
    pub async fn get_document(&self, id: &str, populate: &[Populate]) -> Result<Option<Document>> {
        let Some(document) = self.store.get_document(&self.reference(id)).await? else {
            return Ok(None);
        };
        let Document { reference, fields } = document;
        let fields = populate_fields(self.store.as_ref(), fields, populate, 0).await?;
        Ok(Some(Document::new(reference, fields)))
    }

    /// Await a document response and hydrate each document into `M`,
    /// keeping the store's order
    pub async fn create_models<M, F>(&self, response: F, tag: &str) -> Result<Vec<M>>
    where
        M: Model,
        F: Future<Output = Result<Vec<Document>>>,
    {
        let documents = response.await.map_err(|e| {
            log::error!("{}Service.{} failed: {}", self.service_name(), tag, e);
            e
        })?;

        let models = documents
            .into_iter()
            .map(|document| M::from_fields(&document.into_data()))
            .collect::<Result<Vec<M>>>()
            .map_err(|e| {
                log::error!("{}Service.{} hydration failed: {}", self.service_name(), tag, e);
                e
            })?;

        log::info!(
            "{}Service.{} returned {} models",
            self.service_name(),
            tag,
            models.len()
        );
        Ok(models)
    }

    /// Single-document counterpart of `create_models`
    pub async fn create_model<M, F>(&self, response: F, tag: &str) -> Result<Option<M>>
    where
        M: Model,
        F: Future<Output = Result<Option<Document>>>,
    {
        let document = response.await.map_err(|e| {
            log::error!("{}Service.{} failed: {}", self.service_name(), tag, e);
            e
        })?;

        match document {
            Some(document) => M::from_fields(&document.into_data()).map(Some),
            None => {
                log::info!("{}Service.{} found nothing", self.service_name(), tag);
                Ok(None)
            }
        }
    }

    fn service_name(&self) -> &'static str {
        match self.collection {
            CollectionName::Body => "Body",
            CollectionName::Event => "Event",
            CollectionName::Session => "Session",
            CollectionName::File => "File",
            CollectionName::Transcript => "Transcript",
        }
    }
}

/// Replaces the references named by `options` with the referenced documents
/// (as inline maps that include `id`). Missing targets stay references.
fn populate_fields<'a>(
    store: &'a dyn DocumentStorePort,
    mut fields: Fields,
    options: &'a [Populate],
    depth: usize,
) -> BoxFuture<'a, Result<Fields>> {
    async move {
        if options.is_empty() {
            return Ok(fields);
        }
        if depth >= MAX_POPULATE_DEPTH {
            log::warn!(
                "Skipping population of {} reference(s) beyond depth {}",
                options.len(),
                MAX_POPULATE_DEPTH
            );
            return Ok(fields);
        }

        let pending = options
            .iter()
            .filter_map(|option| match fields.get(&option.ref_name) {
                Some(Value::Reference(reference)) => {
                    Some((option, Target::Pointer(reference.clone())))
                }
                Some(Value::Map(inline)) if !option.nested.is_empty() => {
                    Some((option, Target::Inline(inline.clone())))
                }
                _ => None,
            })
            .collect::<Vec<_>>();

        let resolved = try_join_all(pending.into_iter().map(|(option, target)| async move {
            let data = match target {
                Target::Pointer(reference) => {
                    if reference.collection() != option.collection.as_str() {
                        log::warn!(
                            "Reference '{}' in '{}' does not point into '{}'",
                            reference,
                            option.ref_name,
                            option.collection
                        );
                    }
                    match store.get_document(&reference).await? {
                        Some(document) => document.into_data(),
                        None => {
                            log::warn!("Referenced document {} does not exist", reference);
                            return Ok(None);
                        }
                    }
                }
                Target::Inline(inline) => inline,
            };
            let data = populate_fields(store, data, &option.nested, depth + 1).await?;
            Ok::<_, crate::error::AppError>(Some((option.ref_name.clone(), data)))
        }))
        .await?;

        for (ref_name, data) in resolved.into_iter().flatten() {
            fields.insert(ref_name, Value::Map(data));
        }
        Ok(fields)
    }
    .boxed()
}

enum Target {
    Pointer(DocumentReference),
    Inline(Fields),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::MemoryStore;
    use crate::domain::models::Transcript;
    use crate::ports::mocks::RecordingStore;
    use serde_json::json;

    fn chain_store() -> Arc<MemoryStore> {
        Arc::new(
            MemoryStore::from_fixture(&json!({
                "body": { "b1": { "name": "City Council" } },
                "event": { "e1": { "body_ref": { "$ref": "body/b1" } } },
                "session": { "s1": { "event_ref": { "$ref": "event/e1" }, "session_index": 0 } },
                "file": { "f1": { "uri": "gs://t1.json" } },
                "transcript": {
                    "t1": {
                        "session_ref": { "$ref": "session/s1" },
                        "file_ref": { "$ref": "file/missing" }
                    }
                }
            }))
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_populate_nested_chain() {
        let base = ModelService::new(CollectionName::Transcript, chain_store());
        let populate = vec![
            Populate::new(CollectionName::Session, "session_ref").with_nested(vec![
                Populate::new(CollectionName::Event, "event_ref")
                    .with_nested(vec![Populate::new(CollectionName::Body, "body_ref")]),
            ]),
            Populate::new(CollectionName::File, "file_ref"),
        ];

        let transcripts: Vec<Transcript> = base
            .create_models(base.get_documents(vec![], &populate), "test()")
            .await
            .unwrap();

        assert_eq!(transcripts.len(), 1);
        let transcript = &transcripts[0];
        let session = transcript.session().unwrap();
        assert_eq!(session.id.as_deref(), Some("s1"));
        let body = session.event().unwrap().body().unwrap();
        assert_eq!(body.name.as_deref(), Some("City Council"));
        // the file does not exist, so it stays a pointer
        assert_eq!(transcript.file_ref.as_ref().unwrap().id(), Some("missing"));
    }

    #[tokio::test]
    async fn test_populate_stops_at_depth_cap() {
        let store = Arc::new(MemoryStore::new());
        // a self-referencing chain: every session points at itself
        let mut fields = Fields::new();
        fields.insert(
            "event_ref".to_string(),
            Value::Reference(DocumentReference::new("session", "loop")),
        );
        store.insert(&DocumentReference::new("session", "loop"), fields.clone());

        let mut option = Populate::new(CollectionName::Session, "event_ref");
        for _ in 0..10 {
            option = Populate::new(CollectionName::Session, "event_ref").with_nested(vec![option]);
        }

        let populated = populate_fields(&*store, fields, &[option], 0)
            .await
            .unwrap();

        let mut depth = 0;
        let mut current = &populated;
        while let Some(Value::Map(inner)) = current.get("event_ref") {
            depth += 1;
            current = inner;
        }
        assert_eq!(depth, MAX_POPULATE_DEPTH);
        assert!(matches!(current.get("event_ref"), Some(Value::Reference(_))));
    }

    #[tokio::test]
    async fn test_store_error_is_passed_through() {
        let store = Arc::new(RecordingStore::new().failing("quota exceeded"));
        let base = ModelService::new(CollectionName::Body, store);

        let result: Result<Vec<Transcript>> = base
            .create_models(base.get_documents(vec![], &[]), "test()")
            .await;
        match result {
            Err(crate::error::AppError::Store(message)) => assert_eq!(message, "quota exceeded"),
            other => panic!("expected store error, got {:?}", other.map(|v| v.len())),
        }
    }

    #[tokio::test]
    async fn test_get_document_missing() {
        let base = ModelService::new(CollectionName::Body, chain_store());
        let found: Option<Transcript> = base
            .create_model(base.get_document("nope", &[]), "test()")
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
