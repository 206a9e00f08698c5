//! Reference entities (authors, categories, publishers)

use serde::{Deserialize, Serialize};

use super::enums::Status;

/// Lookup-table record a book points at.
///
/// Authors, categories and publishers all share this shape on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: Status,
}

pub type Author = ReferenceEntity;
pub type Category = ReferenceEntity;
pub type Publisher = ReferenceEntity;

impl ReferenceEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: Status::Enabled,
        }
    }
}

/// Create reference entity request
#[derive(Debug, Clone, Serialize)]
pub struct CreateReference {
    pub name: String,
    pub status: Status,
}

/// Update reference entity request
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}
