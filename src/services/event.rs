//! Event collection service

use crate::domain::models::Event;
use crate::domain::value::DocumentReference;
use crate::error::Result;
use crate::ports::document_store::{order_by, where_field, Direction, DocumentStorePort, Operator};
use crate::services::collections::{
    CollectionName, EVENT_BODY_REF, EVENT_HOVER_THUMBNAIL_REF, EVENT_STATIC_THUMBNAIL_REF,
};
use crate::services::model_service::{ModelService, Populate};
use std::sync::Arc;

pub struct EventService {
    base: ModelService,
}

impl EventService {
    pub fn new(store: Arc<dyn DocumentStorePort>) -> Self {
        Self {
            base: ModelService::new(CollectionName::Event, store),
        }
    }

    /// One event with its body and thumbnails resolved
    pub async fn get_event_by_id(&self, event_id: &str) -> Result<Option<Event>> {
        let populate = [
            Populate::new(CollectionName::Body, EVENT_BODY_REF),
            Populate::new(CollectionName::File, EVENT_STATIC_THUMBNAIL_REF),
            Populate::new(CollectionName::File, EVENT_HOVER_THUMBNAIL_REF),
        ];
        let response = self.base.get_document(event_id, &populate);
        self.base
            .create_model(response, &format!("get_event_by_id({})", event_id))
            .await
    }

    /// Events of a body, most recent first
    pub async fn get_events_by_body_id(&self, body_id: &str) -> Result<Vec<Event>> {
        let body = DocumentReference::new(CollectionName::Body.as_str(), body_id);
        let response = self.base.get_documents(
            vec![
                where_field(EVENT_BODY_REF, Operator::Equal, body),
                order_by("event_datetime", Direction::Descending),
            ],
            &[],
        );
        self.base
            .create_models(response, &format!("get_events_by_body_id({})", body_id))
            .await
    }
}
