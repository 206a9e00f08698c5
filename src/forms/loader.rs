//! One-shot loading of a reference list

use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    error::{AppError, AppResult},
    models::{ReferenceEntity, ReferenceKind},
    services::reference::ReferenceSource,
};

/// Load state of one field's reference list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReferenceList {
    #[default]
    Uninitialized,
    Loading,
    Ready(Arc<[ReferenceEntity]>),
    Failed(String),
}

/// Lifecycle of a reference field, as seen by the host UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

impl ReferenceList {
    /// Loaded entities, `None` until the fetch has succeeded
    pub fn entities(&self) -> Option<&[ReferenceEntity]> {
        match self {
            ReferenceList::Ready(entities) => Some(&entities[..]),
            _ => None,
        }
    }

    pub fn state(&self) -> FieldState {
        match self {
            ReferenceList::Uninitialized => FieldState::Uninitialized,
            ReferenceList::Loading => FieldState::Loading,
            ReferenceList::Ready(_) => FieldState::Ready,
            ReferenceList::Failed(_) => FieldState::Failed,
        }
    }

    /// The load has finished, successfully or not
    pub fn is_settled(&self) -> bool {
        matches!(self, ReferenceList::Ready(_) | ReferenceList::Failed(_))
    }
}

/// Fetches the enabled entities of one kind and publishes them to the field.
///
/// `load` consumes the loader, so a form session fetches each list once.
pub struct ReferenceListLoader {
    kind: ReferenceKind,
    source: Arc<dyn ReferenceSource>,
    tx: watch::Sender<ReferenceList>,
}

impl ReferenceListLoader {
    pub fn new(
        kind: ReferenceKind,
        source: Arc<dyn ReferenceSource>,
    ) -> (Self, watch::Receiver<ReferenceList>) {
        let (tx, rx) = watch::channel(ReferenceList::Uninitialized);
        (Self { kind, source, tx }, rx)
    }

    /// Fetch the list and publish it. Returns the number of entities loaded.
    ///
    /// On failure the list is published as `Failed` and the error returned;
    /// there is no retry.
    pub async fn load(self) -> AppResult<usize> {
        self.tx.send_replace(ReferenceList::Loading);
        tracing::debug!("Loading {} list", self.kind);

        match self.source.fetch_enabled().await {
            Ok(entities) => {
                // Only enabled entities are ever offered for selection
                let list: Arc<[ReferenceEntity]> = entities
                    .into_iter()
                    .filter(|e| e.status.is_enabled())
                    .collect();
                let count = list.len();
                tracing::info!("Loaded {} {} entries", count, self.kind);
                self.tx.send_replace(ReferenceList::Ready(list));
                Ok(count)
            }
            Err(e) => {
                tracing::warn!("Failed to load {} list: {}", self.kind, e);
                self.tx.send_replace(ReferenceList::Failed(e.user_message()));
                Err(AppError::ReferenceLoad {
                    kind: self.kind.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}
