//! Elidune admin client core
//!
//! Typed REST services for the Elidune catalog API and the reactive book
//! form: live author/category/publisher typeahead fields, edit-mode record
//! reconciliation and guarded submission.

pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
