//! Book add/edit form controller
//!
//! Owns the form record and one typeahead pipeline per reference field
//! (author, category, publisher). In edit mode the existing book is fetched
//! in the background and merged into the live fields once it arrives.

use std::collections::BTreeMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, PoisonError, Weak,
};

use tokio::sync::watch;
use validator::Validate;

use super::{
    filter::{display_name, TypeaheadPipeline},
    loader::{FieldState, ReferenceList, ReferenceListLoader},
    TaskGuard,
};
use crate::{
    config::FormsConfig,
    error::{AppError, AppResult},
    models::{Book, BookFormValue, BookPayload, FieldValue, ReferenceEntity, ReferenceKind, Status},
    services::{
        alerts::AlertService, books::BookStore, navigation::Navigator,
        reference::ReferenceSource, Services,
    },
};

/// Create or edit, fixed when the form is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormStatus {
    /// Waiting for the book being edited
    Loading,
    Ready,
    FetchFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
    Idle,
    Submitting,
    Succeeded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Saved(Book),
    /// Another submission was in flight, or the form is not ready
    Ignored,
}

/// Collaborators of the book form
pub struct BookFormDeps {
    pub authors: Arc<dyn ReferenceSource>,
    pub categories: Arc<dyn ReferenceSource>,
    pub publishers: Arc<dyn ReferenceSource>,
    pub books: Arc<dyn BookStore>,
    pub alerts: AlertService,
    pub navigator: Navigator,
    pub book_list_url: String,
}

impl BookFormDeps {
    pub fn from_services(services: &Services, navigator: Navigator, forms: &FormsConfig) -> Self {
        Self {
            authors: Arc::new(services.authors.clone()),
            categories: Arc::new(services.categories.clone()),
            publishers: Arc::new(services.publishers.clone()),
            books: Arc::new(services.books.clone()),
            alerts: services.alerts.clone(),
            navigator,
            book_list_url: forms.book_list_url.clone(),
        }
    }
}

/// One combo-box field: its value channel, reference list and candidates
pub struct ReferenceField {
    kind: ReferenceKind,
    value: watch::Sender<FieldValue>,
    list: watch::Receiver<ReferenceList>,
    pipeline: TypeaheadPipeline,
}

impl ReferenceField {
    fn start(
        kind: ReferenceKind,
        source: Arc<dyn ReferenceSource>,
        tasks: &mut Vec<TaskGuard>,
    ) -> Self {
        let (value, value_rx) = watch::channel(FieldValue::Empty);
        let (loader, list) = ReferenceListLoader::new(kind, source);
        let pipeline = TypeaheadPipeline::spawn(kind, value_rx, list.clone());

        tasks.push(TaskGuard::new(tokio::spawn(async move {
            if let Err(e) = loader.load().await {
                tracing::debug!("{}", e);
            }
        })));

        Self {
            kind,
            value,
            list,
            pipeline,
        }
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    pub fn value(&self) -> FieldValue {
        self.value.borrow().clone()
    }

    /// Keystroke in the input box
    pub fn input(&self, text: &str) {
        tracing::debug!("{} input {:?}", self.kind, text);
        self.value.send_replace(FieldValue::text(text));
    }

    pub fn select(&self, entity: ReferenceEntity) {
        tracing::debug!("{} selected {}", self.kind, entity.id);
        self.value.send_replace(FieldValue::Selected(entity));
    }

    /// Select the candidate at `index` of the current candidate list
    pub fn choose(&self, index: usize) -> Option<ReferenceEntity> {
        let entity = self.pipeline.candidates().into_iter().nth(index)?;
        self.select(entity.clone());
        Some(entity)
    }

    pub fn clear(&self) {
        self.value.send_replace(FieldValue::Empty);
    }

    fn patch(&self, value: FieldValue) {
        self.value.send_replace(value);
    }

    /// Text the input box shows for the current value
    pub fn display_value(&self) -> String {
        match &*self.value.borrow() {
            FieldValue::Selected(entity) => display_name(Some(entity)).to_string(),
            FieldValue::RawText(text) => text.clone(),
            FieldValue::Empty => display_name(None).to_string(),
        }
    }

    pub fn state(&self) -> FieldState {
        self.list.borrow().state()
    }

    pub fn load_error(&self) -> Option<String> {
        match &*self.list.borrow() {
            ReferenceList::Failed(message) => Some(message.clone()),
            _ => None,
        }
    }

    /// Wait for the reference list to finish loading
    pub async fn loaded(&self) -> FieldState {
        let mut rx = self.list.clone();
        if let Ok(list) = rx.wait_for(ReferenceList::is_settled).await {
            return list.state();
        }
        self.state()
    }

    pub fn candidates(&self) -> Vec<ReferenceEntity> {
        self.pipeline.candidates()
    }

    pub fn subscribe_candidates(&self) -> watch::Receiver<Vec<ReferenceEntity>> {
        self.pipeline.subscribe()
    }

    pub fn subscribe_value(&self) -> watch::Receiver<FieldValue> {
        self.value.subscribe()
    }
}

struct ScalarFields {
    name: String,
    description: String,
    access_book_num: String,
    status: Status,
}

struct FormInner {
    mode: FormMode,
    author: ReferenceField,
    category: ReferenceField,
    publisher: ReferenceField,
    scalars: Mutex<ScalarFields>,
    status: watch::Sender<FormStatus>,
    submit_state: watch::Sender<SubmitState>,
    submitted: AtomicBool,
    books: Arc<dyn BookStore>,
    alerts: AlertService,
    navigator: Navigator,
    book_list_url: String,
    tasks: Mutex<Vec<TaskGuard>>,
}

impl FormInner {
    fn scalars(&self) -> MutexGuard<'_, ScalarFields> {
        self.scalars.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn field(&self, kind: ReferenceKind) -> &ReferenceField {
        match kind {
            ReferenceKind::Author => &self.author,
            ReferenceKind::Category => &self.category,
            ReferenceKind::Publisher => &self.publisher,
        }
    }

    /// Merge a fetched book into the live fields
    fn reconcile(&self, mut book: Book) {
        tracing::info!("Loaded book {} for editing", book.id);

        // Nested entities go in first and as `Selected`; the bulk patch
        // below only carries scalar fields.
        self.author.patch(FieldValue::from(book.author.take()));
        self.category.patch(FieldValue::from(book.category.take()));
        self.publisher.patch(FieldValue::from(book.publisher.take()));
        self.patch_value(&book);

        self.status.send_replace(FormStatus::Ready);
    }

    fn patch_value(&self, book: &Book) {
        let mut scalars = self.scalars();
        scalars.name = book.name.clone();
        scalars.description = book.description.clone().unwrap_or_default();
        scalars.access_book_num = book.access_book_num.clone().unwrap_or_default();
        scalars.status = book.status;
    }

    fn fetch_failed(&self, id: &str, error: AppError) {
        tracing::error!("Failed to load book {}: {}", id, error);
        let error = AppError::RecordFetch(error.user_message());
        let message = error.to_string();
        self.alerts.error(message.clone());
        self.status.send_replace(FormStatus::FetchFailed(message));
    }
}

async fn fetch_record(form: Weak<FormInner>, books: Arc<dyn BookStore>, id: String) {
    let result = books.fetch(&id).await;

    let Some(form) = form.upgrade() else {
        tracing::debug!("Book form closed before book {} arrived", id);
        return;
    };

    match result {
        Ok(book) => form.reconcile(book),
        Err(e) => form.fetch_failed(&id, e),
    }
}

/// Add/edit book form.
///
/// Dropping the controller stops its reference loads, typeahead pipelines
/// and any pending record fetch.
pub struct BookFormController {
    inner: Arc<FormInner>,
}

impl BookFormController {
    /// Open the form; `id` selects edit mode. Must run inside a tokio runtime.
    pub fn open(deps: BookFormDeps, id: Option<String>) -> Self {
        let mode = match id {
            Some(id) => FormMode::Edit(id),
            None => FormMode::Create,
        };

        // Pipelines are subscribed and seeded before the record fetch is
        // spawned, so a patched value always lands on a live pipeline.
        let mut tasks = Vec::new();
        let author = ReferenceField::start(ReferenceKind::Author, deps.authors, &mut tasks);
        let category = ReferenceField::start(ReferenceKind::Category, deps.categories, &mut tasks);
        let publisher =
            ReferenceField::start(ReferenceKind::Publisher, deps.publishers, &mut tasks);

        let initial = match mode {
            FormMode::Create => FormStatus::Ready,
            FormMode::Edit(_) => FormStatus::Loading,
        };
        let (status, _) = watch::channel(initial);
        let (submit_state, _) = watch::channel(SubmitState::Idle);

        let inner = Arc::new(FormInner {
            mode,
            author,
            category,
            publisher,
            scalars: Mutex::new(ScalarFields {
                name: String::new(),
                description: String::new(),
                access_book_num: String::new(),
                status: Status::Enabled,
            }),
            status,
            submit_state,
            submitted: AtomicBool::new(false),
            books: deps.books,
            alerts: deps.alerts,
            navigator: deps.navigator,
            book_list_url: deps.book_list_url,
            tasks: Mutex::new(tasks),
        });

        if let FormMode::Edit(id) = &inner.mode {
            let fetch = fetch_record(Arc::downgrade(&inner), inner.books.clone(), id.clone());
            let guard = TaskGuard::new(tokio::spawn(fetch));
            inner
                .tasks
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(guard);
        }

        let form = Self { inner };
        tracing::info!("Opened form: {}", form.title());
        form
    }

    pub fn mode(&self) -> &FormMode {
        &self.inner.mode
    }

    pub fn title(&self) -> &'static str {
        match self.inner.mode {
            FormMode::Create => "Add Book",
            FormMode::Edit(_) => "Edit Book",
        }
    }

    pub fn field(&self, kind: ReferenceKind) -> &ReferenceField {
        self.inner.field(kind)
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.inner.scalars().name = name.into();
    }

    pub fn set_description(&self, description: impl Into<String>) {
        self.inner.scalars().description = description.into();
    }

    pub fn set_access_book_num(&self, access_book_num: impl Into<String>) {
        self.inner.scalars().access_book_num = access_book_num.into();
    }

    pub fn set_status(&self, status: Status) {
        self.inner.scalars().status = status;
    }

    /// Snapshot of every field
    pub fn value(&self) -> BookFormValue {
        let scalars = self.inner.scalars();
        BookFormValue {
            name: scalars.name.clone(),
            author: self.inner.author.value(),
            category: self.inner.category.value(),
            publisher: self.inner.publisher.value(),
            description: scalars.description.clone(),
            access_book_num: scalars.access_book_num.clone(),
            status: scalars.status,
        }
    }

    pub fn status(&self) -> FormStatus {
        self.inner.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<FormStatus> {
        self.inner.status.subscribe()
    }

    /// Resolves once the edited record has arrived or failed to load
    pub async fn wait_until_loaded(&self) -> FormStatus {
        let mut rx = self.subscribe_status();
        let status = match rx.wait_for(|s| *s != FormStatus::Loading).await {
            Ok(status) => status.clone(),
            Err(_) => self.status(),
        };
        status
    }

    pub fn submit_state(&self) -> SubmitState {
        *self.inner.submit_state.borrow()
    }

    /// Whether a submit has been attempted
    pub fn submitted(&self) -> bool {
        self.inner.submitted.load(Ordering::Relaxed)
    }

    /// Per-field validation messages, reported once a submit was attempted
    pub fn field_errors(&self) -> BTreeMap<String, Vec<String>> {
        if !self.submitted() {
            return BTreeMap::new();
        }

        match self.value().validate() {
            Ok(()) => BTreeMap::new(),
            Err(errors) => errors
                .field_errors()
                .into_iter()
                .map(|(field, errs)| {
                    let messages = errs
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map_or_else(|| e.code.to_string(), |m| m.to_string())
                        })
                        .collect();
                    (field.to_string(), messages)
                })
                .collect(),
        }
    }

    /// Validate and save the book.
    ///
    /// Invalid forms are rejected locally with `AppError::InvalidForm`
    /// before any request is made. On success a "Book saved" alert is kept
    /// across the navigation to the book list.
    pub async fn submit(&self) -> AppResult<SubmitOutcome> {
        let inner = &self.inner;

        if *inner.submit_state.borrow() != SubmitState::Idle {
            tracing::debug!("Submit ignored: book already submitted");
            return Ok(SubmitOutcome::Ignored);
        }

        // A form still loading or failed to load keeps its alert
        if *inner.status.borrow() != FormStatus::Ready {
            tracing::debug!("Submit ignored: form is not ready");
            return Ok(SubmitOutcome::Ignored);
        }

        inner.submitted.store(true, Ordering::Relaxed);
        inner.alerts.clear();

        let payload = match BookPayload::try_from(self.value()) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!("Submit blocked: {}", e);
                return Err(e);
            }
        };

        let claimed = inner.submit_state.send_if_modified(|state| {
            if *state == SubmitState::Idle {
                *state = SubmitState::Submitting;
                true
            } else {
                false
            }
        });
        if !claimed {
            return Ok(SubmitOutcome::Ignored);
        }

        let result = match &inner.mode {
            FormMode::Create => inner.books.create(&payload).await,
            FormMode::Edit(id) => inner.books.update(id, &payload).await,
        };

        match result {
            Ok(book) => {
                tracing::info!("Saved book {}", book.id);
                inner.submit_state.send_replace(SubmitState::Succeeded);
                inner.alerts.success("Book saved", true);
                inner.navigator.navigate_by_url(inner.book_list_url.clone());
                Ok(SubmitOutcome::Saved(book))
            }
            Err(e) => {
                tracing::error!("Failed to save book: {}", e);
                inner.alerts.error(e.user_message());
                inner.submit_state.send_replace(SubmitState::Idle);
                Err(e)
            }
        }
    }
}
