//! Typeahead candidate filtering for reference fields

use tokio::sync::watch;
use tokio_stream::{wrappers::WatchStream, StreamExt};

use super::{loader::ReferenceList, TaskGuard};
use crate::models::{FieldValue, ReferenceEntity, ReferenceKind};

/// Entities of `list` matching the field value.
///
/// An empty query offers the whole list. Otherwise an entity matches when
/// its name contains the query, ignoring case. Load order is preserved and a
/// list that is not loaded yields no candidates.
pub fn derive_candidates(value: &FieldValue, list: &ReferenceList) -> Vec<ReferenceEntity> {
    let Some(entities) = list.entities() else {
        return Vec::new();
    };

    let query = value.query();
    if query.is_empty() {
        return entities.to_vec();
    }

    let needle = query.to_lowercase();
    entities
        .iter()
        .filter(|e| e.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Text shown in the input box for a selected entity
pub fn display_name(entity: Option<&ReferenceEntity>) -> &str {
    entity.map_or("", |e| e.name.as_str())
}

enum Trigger {
    Value(FieldValue),
    List(ReferenceList),
}

/// Live candidate list of one reference field.
///
/// Candidates are recomputed whenever the field value or the reference list
/// changes. The background task stops when the pipeline is dropped.
pub struct TypeaheadPipeline {
    candidates: watch::Receiver<Vec<ReferenceEntity>>,
    _task: TaskGuard,
}

impl TypeaheadPipeline {
    /// Subscribe to the field and compute the seed candidates from the
    /// current value, so a list is available before the first keystroke.
    pub fn spawn(
        kind: ReferenceKind,
        value: watch::Receiver<FieldValue>,
        list: watch::Receiver<ReferenceList>,
    ) -> Self {
        let seed = derive_candidates(&value.borrow(), &list.borrow());
        let (tx, rx) = watch::channel(seed);
        let task = tokio::spawn(run(kind, value, list, tx));

        Self {
            candidates: rx,
            _task: TaskGuard::new(task),
        }
    }

    pub fn candidates(&self) -> Vec<ReferenceEntity> {
        self.candidates.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<ReferenceEntity>> {
        self.candidates.clone()
    }
}

async fn run(
    kind: ReferenceKind,
    value_rx: watch::Receiver<FieldValue>,
    list_rx: watch::Receiver<ReferenceList>,
    tx: watch::Sender<Vec<ReferenceEntity>>,
) {
    let mut value = value_rx.borrow().clone();
    let mut list = list_rx.borrow().clone();

    // Both streams start by repeating the current value
    let values = WatchStream::new(value_rx).map(Trigger::Value);
    let lists = WatchStream::new(list_rx).map(Trigger::List);
    let mut triggers = values.merge(lists);

    while let Some(trigger) = triggers.next().await {
        match trigger {
            Trigger::Value(v) => value = v,
            Trigger::List(l) => list = l,
        }

        let next = derive_candidates(&value, &list);
        tracing::debug!("{} query {:?}: {} candidates", kind, value.query(), next.len());
        tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    tracing::debug!("{} typeahead closed", kind);
}
