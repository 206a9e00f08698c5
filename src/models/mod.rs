//! Data models for the Elidune admin client

pub mod book;
pub mod borrow_record;
pub mod enums;
pub mod field;
pub mod reference;

// Re-export commonly used types
pub use book::{Book, BookFormValue, BookPayload};
pub use borrow_record::BorrowRecord;
pub use enums::{ReferenceKind, Status};
pub use field::FieldValue;
pub use reference::{Author, Category, Publisher, ReferenceEntity};
