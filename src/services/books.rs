//! Book service

use async_trait::async_trait;

use super::ApiClient;
use crate::{
    error::AppResult,
    models::{Book, BookPayload},
};

const RESOURCE: &str = "Book";

/// Persistence operations the book form needs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn fetch(&self, id: &str) -> AppResult<Book>;
    async fn create(&self, payload: &BookPayload) -> AppResult<Book>;
    async fn update(&self, id: &str, payload: &BookPayload) -> AppResult<Book>;
}

#[derive(Clone)]
pub struct BookService {
    client: ApiClient,
}

impl BookService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_all(&self) -> AppResult<Vec<Book>> {
        self.client.get(RESOURCE).await
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<Book> {
        self.client.get(&format!("{}/{}", RESOURCE, id)).await
    }

    pub async fn create(&self, payload: &BookPayload) -> AppResult<Book> {
        self.client.post(RESOURCE, payload).await
    }

    pub async fn update(&self, id: &str, payload: &BookPayload) -> AppResult<Book> {
        self.client.put(&format!("{}/{}", RESOURCE, id), payload).await
    }
}

#[async_trait]
impl BookStore for BookService {
    async fn fetch(&self, id: &str) -> AppResult<Book> {
        self.get_by_id(id).await
    }

    async fn create(&self, payload: &BookPayload) -> AppResult<Book> {
        BookService::create(self, payload).await
    }

    async fn update(&self, id: &str, payload: &BookPayload) -> AppResult<Book> {
        BookService::update(self, id, payload).await
    }
}
