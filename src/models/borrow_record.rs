//! Borrow record (loan) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{book::Book, enums::Status};

/// Borrow record as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowRecord {
    pub id: String,
    pub book: Option<Book>,
    pub borrower: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Status,
}

/// Create borrow record request
#[derive(Debug, Clone, Serialize)]
pub struct CreateBorrowRecord {
    pub book_id: String,
    pub borrower: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Update borrow record request
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateBorrowRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}
