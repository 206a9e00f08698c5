//! Borrow record service

use super::ApiClient;
use crate::{
    error::{AppError, AppResult},
    models::borrow_record::{BorrowRecord, CreateBorrowRecord, UpdateBorrowRecord},
};

const RESOURCE: &str = "BorrowRecord";

#[derive(Clone)]
pub struct BorrowRecordService {
    client: ApiClient,
}

impl BorrowRecordService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_all(&self) -> AppResult<Vec<BorrowRecord>> {
        self.client.get(RESOURCE).await
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<BorrowRecord> {
        self.client.get(&format!("{}/{}", RESOURCE, id)).await
    }

    pub async fn create(&self, data: &CreateBorrowRecord) -> AppResult<BorrowRecord> {
        if data.borrower.trim().is_empty() {
            return Err(AppError::Validation("Borrower cannot be empty".to_string()));
        }
        if let Some(due) = data.due_date {
            if due < data.borrow_date {
                return Err(AppError::Validation(
                    "Due date cannot precede the borrow date".to_string(),
                ));
            }
        }
        self.client.post(RESOURCE, data).await
    }

    pub async fn update(&self, id: &str, data: &UpdateBorrowRecord) -> AppResult<BorrowRecord> {
        self.client.put(&format!("{}/{}", RESOURCE, id), data).await
    }
}
