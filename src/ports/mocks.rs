//! Mock implementations for testing

use crate::domain::value::{Document, DocumentReference};
use crate::error::{AppError, Result};
use crate::ports::document_store::{DocumentStorePort, Query};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Store mock that records every request and answers with canned documents.
///
/// Queries return the documents registered for the collection verbatim,
/// without applying filters or ordering.
#[derive(Clone, Default)]
pub struct RecordingStore {
    results: Arc<Mutex<HashMap<String, Vec<Document>>>>,
    queries: Arc<Mutex<Vec<Query>>>,
    lookups: Arc<Mutex<Vec<DocumentReference>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the documents returned for queries on `collection`
    pub fn with_results(self, collection: &str, documents: Vec<Document>) -> Self {
        self.results
            .lock()
            .unwrap()
            .insert(collection.to_string(), documents);
        self
    }

    /// Makes every request fail with a store error carrying `message`
    pub fn failing(self, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn queries(&self) -> Vec<Query> {
        self.queries.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> Vec<DocumentReference> {
        self.lookups.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Result<()> {
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(AppError::Store(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStorePort for RecordingStore {
    async fn run_query(&self, query: &Query) -> Result<Vec<Document>> {
        self.queries.lock().unwrap().push(query.clone());
        self.check_failure()?;
        Ok(self
            .results
            .lock()
            .unwrap()
            .get(&query.collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_document(&self, reference: &DocumentReference) -> Result<Option<Document>> {
        self.lookups.lock().unwrap().push(reference.clone());
        self.check_failure()?;
        Ok(self
            .results
            .lock()
            .unwrap()
            .get(reference.collection())
            .and_then(|docs| docs.iter().find(|d| d.reference == *reference).cloned()))
    }
}
