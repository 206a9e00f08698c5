//! Shared domain enums

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Record status shared by every catalog entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Enabled,
    Disabled,
}

impl Status {
    pub fn is_enabled(self) -> bool {
        matches!(self, Status::Enabled)
    }

    /// Query-string form used by the REST API
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Enabled => "enabled",
            Status::Disabled => "disabled",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Status::Enabled => "Enabled",
            Status::Disabled => "Disabled",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "enabled" => Ok(Status::Enabled),
            "disabled" => Ok(Status::Disabled),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// ReferenceKind
// ---------------------------------------------------------------------------

/// Lookup tables a book refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Author,
    Category,
    Publisher,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 3] = [
        ReferenceKind::Author,
        ReferenceKind::Category,
        ReferenceKind::Publisher,
    ];

    /// REST resource name, e.g. `/Author`
    pub fn resource(self) -> &'static str {
        match self {
            ReferenceKind::Author => "Author",
            ReferenceKind::Category => "Category",
            ReferenceKind::Publisher => "Publisher",
        }
    }

    /// Name of the matching book form field
    pub fn field_name(self) -> &'static str {
        match self {
            ReferenceKind::Author => "author",
            ReferenceKind::Category => "category",
            ReferenceKind::Publisher => "publisher",
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

impl std::str::FromStr for ReferenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "author" => Ok(ReferenceKind::Author),
            "category" => Ok(ReferenceKind::Category),
            "publisher" => Ok(ReferenceKind::Publisher),
            other => Err(format!("unknown reference field '{}'", other)),
        }
    }
}
