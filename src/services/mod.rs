//! REST services and UI collaborators

pub mod alerts;
pub mod books;
pub mod borrow_records;
pub mod navigation;
pub mod reference;

use std::time::Duration;

use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::ApiConfig,
    error::{AppError, AppResult},
    models::ReferenceKind,
};

/// Thin JSON client bound to the API base URL
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        tracing::debug!("GET {}", path);
        let response = self.http.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        tracing::debug!("POST {}", path);
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        tracing::debug!("PUT {}", path);
        let response = self.http.put(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let error = AppError::from_status(status, &body);
        tracing::warn!("Request failed with {}: {}", status, error);
        Err(error)
    }
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub authors: reference::ReferenceService,
    pub categories: reference::ReferenceService,
    pub publishers: reference::ReferenceService,
    pub books: books::BookService,
    pub borrow_records: borrow_records::BorrowRecordService,
    pub alerts: alerts::AlertService,
}

impl Services {
    /// Create all services against the configured API
    pub fn new(config: &ApiConfig) -> AppResult<Self> {
        let client = ApiClient::new(config)?;

        Ok(Self {
            authors: reference::ReferenceService::new(client.clone(), ReferenceKind::Author),
            categories: reference::ReferenceService::new(client.clone(), ReferenceKind::Category),
            publishers: reference::ReferenceService::new(client.clone(), ReferenceKind::Publisher),
            books: books::BookService::new(client.clone()),
            borrow_records: borrow_records::BorrowRecordService::new(client),
            alerts: alerts::AlertService::new(),
        })
    }
}
