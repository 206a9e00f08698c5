//! Form controllers and their reactive reference-field machinery

pub mod book;
pub mod filter;
pub mod loader;

pub use book::{BookFormController, BookFormDeps, FormMode, FormStatus, ReferenceField, SubmitOutcome, SubmitState};
pub use filter::{derive_candidates, display_name, TypeaheadPipeline};
pub use loader::{FieldState, ReferenceList, ReferenceListLoader};

use tokio::task::JoinHandle;

/// Aborts the wrapped task when the owning form is dropped
pub(crate) struct TaskGuard(JoinHandle<()>);

impl TaskGuard {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self(handle)
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}
