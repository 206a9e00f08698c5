//! Author, category and publisher services

use async_trait::async_trait;

use super::ApiClient;
use crate::{
    error::{AppError, AppResult},
    models::{
        reference::{CreateReference, ReferenceEntity, UpdateReference},
        ReferenceKind, Status,
    },
};

/// Source of the selectable entities for one reference field
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    /// Entities with `status = enabled`, in server order
    async fn fetch_enabled(&self) -> AppResult<Vec<ReferenceEntity>>;
}

#[derive(Clone)]
pub struct ReferenceService {
    client: ApiClient,
    kind: ReferenceKind,
}

impl ReferenceService {
    pub fn new(client: ApiClient, kind: ReferenceKind) -> Self {
        Self { client, kind }
    }

    /// List every entity of this kind
    pub async fn get_all(&self) -> AppResult<Vec<ReferenceEntity>> {
        self.client.get(self.kind.resource()).await
    }

    /// List enabled entities only
    pub async fn get_all_enabled(&self) -> AppResult<Vec<ReferenceEntity>> {
        let path = format!("{}?status={}", self.kind.resource(), Status::Enabled.as_str());
        self.client.get(&path).await
    }

    /// Get entity by ID
    pub async fn get_by_id(&self, id: &str) -> AppResult<ReferenceEntity> {
        self.client
            .get(&format!("{}/{}", self.kind.resource(), id))
            .await
    }

    /// Create an entity
    pub async fn create(&self, data: &CreateReference) -> AppResult<ReferenceEntity> {
        if data.name.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "{} name cannot be empty",
                self.kind.resource()
            )));
        }
        self.client.post(self.kind.resource(), data).await
    }

    /// Update an entity
    pub async fn update(&self, id: &str, data: &UpdateReference) -> AppResult<ReferenceEntity> {
        if let Some(ref name) = data.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation(format!(
                    "{} name cannot be empty",
                    self.kind.resource()
                )));
            }
        }
        self.client
            .put(&format!("{}/{}", self.kind.resource(), id), data)
            .await
    }
}

#[async_trait]
impl ReferenceSource for ReferenceService {
    async fn fetch_enabled(&self) -> AppResult<Vec<ReferenceEntity>> {
        self.get_all_enabled().await
    }
}
