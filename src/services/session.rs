//! Session collection service

use crate::domain::models::Session;
use crate::domain::value::DocumentReference;
use crate::error::Result;
use crate::ports::document_store::{order_by, where_field, Direction, DocumentStorePort, Operator};
use crate::services::collections::{CollectionName, SESSION_EVENT_REF};
use crate::services::model_service::ModelService;
use std::sync::Arc;

pub struct SessionService {
    base: ModelService,
}

impl SessionService {
    pub fn new(store: Arc<dyn DocumentStorePort>) -> Self {
        Self {
            base: ModelService::new(CollectionName::Session, store),
        }
    }

    /// Sessions of an event in session order
    pub async fn get_sessions_by_event_id(&self, event_id: &str) -> Result<Vec<Session>> {
        let event = DocumentReference::new(CollectionName::Event.as_str(), event_id);
        let response = self.base.get_documents(
            vec![
                where_field(SESSION_EVENT_REF, Operator::Equal, event),
                order_by("session_index", Direction::Ascending),
            ],
            &[],
        );
        self.base
            .create_models(response, &format!("get_sessions_by_event_id({})", event_id))
            .await
    }

    pub async fn get_session_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        let response = self.base.get_document(session_id, &[]);
        self.base
            .create_model(response, &format!("get_session_by_id({})", session_id))
            .await
    }
}
