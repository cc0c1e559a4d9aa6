//! Body collection service

use crate::domain::models::Body;
use crate::error::Result;
use crate::ports::document_store::{order_by, Direction, DocumentStorePort};
use crate::services::collections::CollectionName;
use crate::services::model_service::ModelService;
use std::sync::Arc;

pub struct BodyService {
    base: ModelService,
}

impl BodyService {
    pub fn new(store: Arc<dyn DocumentStorePort>) -> Self {
        Self {
            base: ModelService::new(CollectionName::Body, store),
        }
    }

    /// All bodies, ascending by name
    pub async fn get_all_bodies(&self) -> Result<Vec<Body>> {
        let response = self
            .base
            .get_documents(vec![order_by("name", Direction::Ascending)], &[]);
        self.base.create_models(response, "get_all_bodies()").await
    }

    pub async fn get_body_by_id(&self, body_id: &str) -> Result<Option<Body>> {
        let response = self.base.get_document(body_id, &[]);
        self.base
            .create_model(response, &format!("get_body_by_id({})", body_id))
            .await
    }
}
