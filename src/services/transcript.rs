//! Transcript collection service

use crate::domain::models::Transcript;
use crate::domain::value::DocumentReference;
use crate::error::Result;
use crate::ports::document_store::{order_by, where_field, Direction, DocumentStorePort, Operator};
use crate::services::collections::{CollectionName, TRANSCRIPT_FILE_REF, TRANSCRIPT_SESSION_REF};
use crate::services::model_service::{ModelService, Populate};
use std::sync::Arc;

pub struct TranscriptService {
    base: ModelService,
}

impl TranscriptService {
    pub fn new(store: Arc<dyn DocumentStorePort>) -> Self {
        Self {
            base: ModelService::new(CollectionName::Transcript, store),
        }
    }

    /// Transcripts of a session, newest first, with their files resolved
    pub async fn get_transcripts_by_session_id(&self, session_id: &str) -> Result<Vec<Transcript>> {
        let session = DocumentReference::new(CollectionName::Session.as_str(), session_id);
        let populate = [Populate::new(CollectionName::File, TRANSCRIPT_FILE_REF)];
        let response = self.base.get_documents(
            vec![
                where_field(TRANSCRIPT_SESSION_REF, Operator::Equal, session),
                order_by("created", Direction::Descending),
            ],
            &populate,
        );
        self.base
            .create_models(
                response,
                &format!("get_transcripts_by_session_id({})", session_id),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::MemoryStore;
    use crate::error::AppError;
    use serde_json::json;

    fn store() -> Arc<MemoryStore> {
        Arc::new(
            MemoryStore::from_fixture(&json!({
                "file": {
                    "f1": { "uri": "gs://bucket/t-old.json" },
                    "f2": { "uri": "gs://bucket/t-new.json" }
                },
                "transcript": {
                    "t1": {
                        "session_ref": { "$ref": "session/s1" },
                        "file_ref": { "$ref": "file/f1" },
                        "confidence": 0.82,
                        "created": { "$timestamp": "2021-01-01T00:00:00Z" }
                    },
                    "t2": {
                        "session_ref": { "$ref": "session/s1" },
                        "file_ref": { "$ref": "file/f2" },
                        "confidence": 0.91,
                        "created": { "$timestamp": "2021-06-01T00:00:00Z" }
                    },
                    "t3": {
                        "session_ref": { "$ref": "session/s2" },
                        "created": { "$timestamp": "2021-07-01T00:00:00Z" }
                    }
                }
            }))
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_get_transcripts_by_session_id() {
        let service = TranscriptService::new(store());
        let transcripts = service.get_transcripts_by_session_id("s1").await.unwrap();

        assert_eq!(transcripts.len(), 2);
        assert_eq!(transcripts[0].id.as_deref(), Some("t2"));
        assert_eq!(transcripts[0].confidence, Some(0.91));
        assert_eq!(
            transcripts[0].file().unwrap().uri.as_deref(),
            Some("gs://bucket/t-new.json")
        );
        // the session itself is not populated
        assert_eq!(transcripts[1].session_ref.as_ref().unwrap().id(), Some("s1"));
        assert!(transcripts[1].session().is_none());
    }

    #[tokio::test]
    async fn test_malformed_created_fails_the_call() {
        let store = store();
        let mut fields = crate::domain::value::Fields::new();
        fields.insert(
            "session_ref".to_string(),
            DocumentReference::new("session", "s1").into(),
        );
        fields.insert("created".to_string(), "last tuesday".into());
        store.insert(&DocumentReference::new("transcript", "bad"), fields);

        let service = TranscriptService::new(store);
        let err = service.get_transcripts_by_session_id("s1").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTimestamp(_)));
    }
}
