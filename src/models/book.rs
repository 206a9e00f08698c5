//! Book model and form value types

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{enums::Status, field::FieldValue, reference::{Author, Category, Publisher}};
use crate::error::{AppError, AppResult};

/// Book as returned by the API, with nested reference objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub name: String,
    pub author: Option<Author>,
    pub category: Option<Category>,
    pub publisher: Option<Publisher>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub access_book_num: Option<String>,
    #[serde(default)]
    pub status: Status,
}

/// Snapshot of every field of the book form
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct BookFormValue {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(custom(function = "validate_selected"))]
    pub author: FieldValue,
    #[validate(custom(function = "validate_selected"))]
    pub category: FieldValue,
    #[validate(custom(function = "validate_selected"))]
    pub publisher: FieldValue,
    pub description: String,
    pub access_book_num: String,
    pub status: Status,
}

impl Default for BookFormValue {
    fn default() -> Self {
        Self {
            name: String::new(),
            author: FieldValue::Empty,
            category: FieldValue::Empty,
            publisher: FieldValue::Empty,
            description: String::new(),
            access_book_num: String::new(),
            status: Status::Enabled,
        }
    }
}

/// Reference fields must hold an entity picked from the candidate list
fn validate_selected(value: &FieldValue) -> Result<(), ValidationError> {
    let message = match value {
        FieldValue::Selected(_) => return Ok(()),
        FieldValue::Empty => "This field is required",
        FieldValue::RawText(_) => "Choose an entry from the list",
    };
    let mut error = ValidationError::new("selection_required");
    error.message = Some(Cow::Borrowed(message));
    Err(error)
}

/// Create / update book request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookPayload {
    pub name: String,
    pub author: Author,
    pub category: Category,
    pub publisher: Publisher,
    pub description: String,
    pub access_book_num: String,
    pub status: Status,
}

impl TryFrom<BookFormValue> for BookPayload {
    type Error = AppError;

    fn try_from(value: BookFormValue) -> AppResult<Self> {
        value.validate()?;

        let (author, category, publisher) = match (value.author, value.category, value.publisher) {
            (
                FieldValue::Selected(author),
                FieldValue::Selected(category),
                FieldValue::Selected(publisher),
            ) => (author, category, publisher),
            _ => {
                return Err(AppError::Internal(
                    "validated form holds an unresolved reference field".to_string(),
                ))
            }
        };

        Ok(Self {
            name: value.name,
            author,
            category,
            publisher,
            description: value.description,
            access_book_num: value.access_book_num,
            status: value.status,
        })
    }
}
