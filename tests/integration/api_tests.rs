//! End-to-end tests of the REST services and the book form against an
//! in-process stub of the Elidune API.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use elidune_admin::{
    config::{ApiConfig, FormsConfig},
    forms::{BookFormController, BookFormDeps, FieldState, FormStatus, SubmitOutcome, SubmitState},
    models::{
        borrow_record::{CreateBorrowRecord, UpdateBorrowRecord},
        reference::{CreateReference, UpdateReference},
        FieldValue, ReferenceEntity, ReferenceKind, Status,
    },
    services::{alerts::AlertKind, navigation::Navigator, Services},
    AppError,
};

type Store = Arc<Mutex<HashMap<String, Vec<Value>>>>;

#[derive(Debug, Deserialize)]
struct ListQuery {
    status: Option<String>,
}

fn error_body(status: StatusCode, code: u32, error: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "code": code, "error": error, "message": message })),
    )
        .into_response()
}

async fn list(
    State(store): State<Store>,
    Path(kind): Path<String>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Value>> {
    let store = store.lock().unwrap();
    let rows: Vec<Value> = store
        .get(&kind)
        .map(|rows| {
            rows.iter()
                .filter(|row| match &query.status {
                    Some(status) => row["status"] == status.as_str(),
                    None => true,
                })
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    Json(rows)
}

async fn get_one(State(store): State<Store>, Path((kind, id)): Path<(String, String)>) -> Response {
    let store = store.lock().unwrap();
    match store
        .get(&kind)
        .and_then(|rows| rows.iter().find(|row| row["id"] == id.as_str()))
    {
        Some(row) => Json(row.clone()).into_response(),
        None => error_body(StatusCode::NOT_FOUND, 5, "NoSuchItem", &format!("{} not found", kind)),
    }
}

async fn create(
    State(store): State<Store>,
    Path(kind): Path<String>,
    Json(mut body): Json<Value>,
) -> Response {
    if body["name"] == "Duplicate" {
        return error_body(
            StatusCode::BAD_REQUEST,
            18,
            "BadValue",
            "A book with this name already exists",
        );
    }

    let mut store = store.lock().unwrap();
    let rows = store.entry(kind.clone()).or_default();
    body["id"] = json!(format!("{}-{}", kind.to_lowercase(), rows.len() + 1));
    rows.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update(
    State(store): State<Store>,
    Path((kind, id)): Path<(String, String)>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut store = store.lock().unwrap();
    let row = store
        .get_mut(&kind)
        .and_then(|rows| rows.iter_mut().find(|row| row["id"] == id.as_str()));
    match row {
        Some(row) => {
            // Partial update: only the fields sent are replaced
            if let (Some(row), Some(fields)) = (row.as_object_mut(), body.as_object_mut()) {
                fields.remove("id");
                row.extend(fields.clone());
            }
            Json(row.clone()).into_response()
        }
        None => error_body(StatusCode::NOT_FOUND, 5, "NoSuchItem", &format!("{} not found", kind)),
    }
}

fn reference(id: &str, name: &str, status: &str) -> Value {
    json!({ "id": id, "name": name, "status": status })
}

fn seeded_store() -> Store {
    let mut data = HashMap::new();
    data.insert(
        "Author".to_string(),
        vec![
            reference("a1", "Asimov", "enabled"),
            reference("a2", "Tolkien", "enabled"),
            reference("a3", "Tolstoy", "enabled"),
            reference("a4", "Tolkien Estate", "disabled"),
        ],
    );
    data.insert(
        "Category".to_string(),
        vec![reference("c1", "Fantasy", "enabled"), reference("c2", "Science", "enabled")],
    );
    data.insert(
        "Publisher".to_string(),
        vec![
            reference("p1", "Allen & Unwin", "enabled"),
            reference("p2", "Gallimard", "enabled"),
        ],
    );
    data.insert(
        "Book".to_string(),
        vec![json!({
            "id": "b1",
            "name": "The Hobbit",
            "author": reference("a2", "Tolkien", "enabled"),
            "category": reference("c1", "Fantasy", "enabled"),
            "publisher": reference("p1", "Allen & Unwin", "enabled"),
            "description": "There and back again",
            "access_book_num": "A-001",
            "status": "enabled"
        })],
    );
    Arc::new(Mutex::new(data))
}

/// Serve the stub API on an ephemeral port and return its base URL
async fn spawn_api(store: Store) -> String {
    let app = Router::new()
        .route("/:kind", get(list).post(create))
        .route("/:kind/:id", get(get_one).put(update))
        .with_state(store);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub API");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Stub API stopped");
    });

    format!("http://{}", addr)
}

async fn services(store: Store) -> Services {
    let base_url = spawn_api(store).await;
    Services::new(&ApiConfig {
        base_url,
        timeout_seconds: 5,
    })
    .expect("Failed to build services")
}

async fn within<F: Future>(fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(5), fut)
        .await
        .expect("timed out")
}

async fn wait_candidates(form: &BookFormController, kind: ReferenceKind, expected: &[&str]) {
    let mut rx = form.field(kind).subscribe_candidates();
    within(rx.wait_for(|c| c.iter().map(|e| e.name.as_str()).eq(expected.iter().copied())))
        .await
        .expect("typeahead closed");
}

#[tokio::test]
async fn test_reference_service_lists_enabled_only() {
    let services = services(seeded_store()).await;

    let enabled = services.authors.get_all_enabled().await.expect("enabled authors");
    let names: Vec<&str> = enabled.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Asimov", "Tolkien", "Tolstoy"]);

    let all = services.authors.get_all().await.expect("all authors");
    assert_eq!(all.len(), 4);

    let publisher = services.publishers.get_by_id("p2").await.expect("publisher");
    assert_eq!(publisher, ReferenceEntity::new("p2", "Gallimard"));
}

#[tokio::test]
async fn test_reference_service_create_and_update() {
    let services = services(seeded_store()).await;

    let blank = services
        .authors
        .create(&CreateReference {
            name: "   ".to_string(),
            status: Status::Enabled,
        })
        .await;
    assert!(matches!(blank, Err(AppError::Validation(_))));

    let created = services
        .authors
        .create(&CreateReference {
            name: "Pratchett".to_string(),
            status: Status::Enabled,
        })
        .await
        .expect("author created");
    assert_eq!(created, ReferenceEntity::new("author-5", "Pratchett"));

    let cleared = services
        .authors
        .update(
            &created.id,
            &UpdateReference {
                name: Some(String::new()),
                status: None,
            },
        )
        .await;
    assert!(matches!(cleared, Err(AppError::Validation(_))));

    let disabled = services
        .authors
        .update(
            &created.id,
            &UpdateReference {
                name: Some("Terry Pratchett".to_string()),
                status: Some(Status::Disabled),
            },
        )
        .await
        .expect("author updated");
    assert_eq!(disabled.name, "Terry Pratchett");
    assert_eq!(disabled.status, Status::Disabled);

    let enabled = services.authors.get_all_enabled().await.expect("enabled authors");
    assert!(enabled.iter().all(|a| a.id != created.id));
}

#[tokio::test]
async fn test_book_service_lists_books() {
    let services = services(seeded_store()).await;

    let books = services.books.get_all().await.expect("books");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].name, "The Hobbit");
    assert_eq!(books[0].author, Some(ReferenceEntity::new("a2", "Tolkien")));
}

#[tokio::test]
async fn test_missing_book_maps_to_not_found() {
    let services = services(seeded_store()).await;

    match services.books.get_by_id("nope").await {
        Err(AppError::NotFound(message)) => assert_eq!(message, "Book not found"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_borrow_record_create_and_fetch() {
    let services = services(seeded_store()).await;

    let result = services
        .borrow_records
        .create(&CreateBorrowRecord {
            book_id: "b1".to_string(),
            borrower: "  ".to_string(),
            borrow_date: chrono::Utc::now(),
            due_date: None,
        })
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let created = services
        .borrow_records
        .create(&CreateBorrowRecord {
            book_id: "b1".to_string(),
            borrower: "Bilbo".to_string(),
            borrow_date: chrono::Utc::now(),
            due_date: None,
        })
        .await
        .expect("borrow record created");
    assert_eq!(created.borrower, "Bilbo");
    assert!(created.return_date.is_none());

    let records = services.borrow_records.get_all().await.expect("borrow records");
    assert_eq!(records.len(), 1);
    let fetched = services
        .borrow_records
        .get_by_id(&created.id)
        .await
        .expect("borrow record");
    assert_eq!(fetched.id, created.id);
}

#[tokio::test]
async fn test_borrow_record_due_date_and_return() {
    let services = services(seeded_store()).await;
    let borrowed = chrono::Utc::now();

    let backwards = services
        .borrow_records
        .create(&CreateBorrowRecord {
            book_id: "b1".to_string(),
            borrower: "Bilbo".to_string(),
            borrow_date: borrowed,
            due_date: Some(borrowed - chrono::Duration::days(1)),
        })
        .await;
    assert!(matches!(backwards, Err(AppError::Validation(_))));
    assert!(services.borrow_records.get_all().await.expect("borrow records").is_empty());

    let created = services
        .borrow_records
        .create(&CreateBorrowRecord {
            book_id: "b1".to_string(),
            borrower: "Bilbo".to_string(),
            borrow_date: borrowed,
            due_date: Some(borrowed + chrono::Duration::days(14)),
        })
        .await
        .expect("borrow record created");

    let returned_at = borrowed + chrono::Duration::days(3);
    let updated = services
        .borrow_records
        .update(
            &created.id,
            &UpdateBorrowRecord {
                return_date: Some(returned_at),
                ..Default::default()
            },
        )
        .await
        .expect("borrow record updated");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.borrower, "Bilbo");
    assert_eq!(updated.return_date, Some(returned_at));
    assert_eq!(updated.due_date, created.due_date);

    let missing = services
        .borrow_records
        .update("nope", &UpdateBorrowRecord::default())
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_create_book_through_typeahead() {
    let store = seeded_store();
    let services = services(store.clone()).await;
    let (navigator, mut navigation) = Navigator::channel(services.alerts.clone());
    let deps = BookFormDeps::from_services(&services, navigator, &FormsConfig::default());
    let form = BookFormController::open(deps, None);

    let author = form.field(ReferenceKind::Author);
    assert_eq!(within(author.loaded()).await, FieldState::Ready);
    wait_candidates(&form, ReferenceKind::Author, &["Asimov", "Tolkien", "Tolstoy"]).await;

    author.input("tol");
    wait_candidates(&form, ReferenceKind::Author, &["Tolkien", "Tolstoy"]).await;
    assert_eq!(author.choose(0).map(|a| a.id), Some("a2".to_string()));

    form.field(ReferenceKind::Category).input("sci");
    wait_candidates(&form, ReferenceKind::Category, &["Science"]).await;
    form.field(ReferenceKind::Category).choose(0);

    form.field(ReferenceKind::Publisher).input("GALL");
    wait_candidates(&form, ReferenceKind::Publisher, &["Gallimard"]).await;
    form.field(ReferenceKind::Publisher).choose(0);

    form.set_name("The Silmarillion");

    let outcome = form.submit().await.expect("book saved");
    let book = match outcome {
        SubmitOutcome::Saved(book) => book,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(book.id, "book-2");
    assert_eq!(navigation.try_recv().expect("navigation").url, "/books");
    assert!(navigation.try_recv().is_err());

    let stored = store.lock().unwrap()["Book"][1].clone();
    assert_eq!(stored["author"], reference("a2", "Tolkien", "enabled"));
    assert_eq!(stored["publisher"]["name"], "Gallimard");
}

#[tokio::test]
async fn test_edit_book_reconciles_and_updates() {
    let store = seeded_store();
    let services = services(store.clone()).await;
    let (navigator, mut navigation) = Navigator::channel(services.alerts.clone());
    let deps = BookFormDeps::from_services(&services, navigator, &FormsConfig::default());
    let form = BookFormController::open(deps, Some("b1".to_string()));

    assert_eq!(within(form.wait_until_loaded()).await, FormStatus::Ready);
    assert_eq!(
        form.field(ReferenceKind::Author).value(),
        FieldValue::Selected(ReferenceEntity::new("a2", "Tolkien"))
    );
    wait_candidates(&form, ReferenceKind::Author, &["Tolkien"]).await;

    form.set_name("The Hobbit (annotated)");
    assert!(matches!(form.submit().await, Ok(SubmitOutcome::Saved(_))));
    assert_eq!(navigation.try_recv().expect("navigation").url, "/books");

    let stored = store.lock().unwrap()["Book"][0].clone();
    assert_eq!(stored["name"], "The Hobbit (annotated)");
    assert_eq!(stored["category"]["id"], "c1");
}

#[tokio::test]
async fn test_server_rejection_surfaces_alert() {
    let services = services(seeded_store()).await;
    let (navigator, mut navigation) = Navigator::channel(services.alerts.clone());
    let deps = BookFormDeps::from_services(&services, navigator, &FormsConfig::default());
    let form = BookFormController::open(deps, None);

    form.set_name("Duplicate");
    form.field(ReferenceKind::Author).select(ReferenceEntity::new("a1", "Asimov"));
    form.field(ReferenceKind::Category).select(ReferenceEntity::new("c2", "Science"));
    form.field(ReferenceKind::Publisher).select(ReferenceEntity::new("p2", "Gallimard"));

    assert!(matches!(form.submit().await, Err(AppError::Validation(_))));
    assert_eq!(form.submit_state(), SubmitState::Idle);
    assert!(navigation.try_recv().is_err());

    let alert = services.alerts.current().expect("error alert");
    assert_eq!(alert.kind, AlertKind::Error);
    assert_eq!(alert.message, "A book with this name already exists");
}

#[tokio::test]
async fn test_edit_missing_book_reports_failure() {
    let services = services(seeded_store()).await;
    let (navigator, _navigation) = Navigator::channel(services.alerts.clone());
    let deps = BookFormDeps::from_services(&services, navigator, &FormsConfig::default());
    let form = BookFormController::open(deps, Some("missing".to_string()));

    match within(form.wait_until_loaded()).await {
        FormStatus::FetchFailed(message) => assert!(message.contains("Book not found")),
        other => panic!("unexpected status: {:?}", other),
    }
}
