//! File collection service

use crate::domain::models::File;
use crate::error::Result;
use crate::ports::document_store::DocumentStorePort;
use crate::services::collections::CollectionName;
use crate::services::model_service::ModelService;
use std::sync::Arc;

pub struct FileService {
    base: ModelService,
}

impl FileService {
    pub fn new(store: Arc<dyn DocumentStorePort>) -> Self {
        Self {
            base: ModelService::new(CollectionName::File, store),
        }
    }

    pub async fn get_file_by_id(&self, file_id: &str) -> Result<Option<File>> {
        let response = self.base.get_document(file_id, &[]);
        self.base
            .create_model(response, &format!("get_file_by_id({})", file_id))
            .await
    }
}
