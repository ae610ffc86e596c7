//! Web API upload tests.
//!
//! Drives the full ingestion pipeline through the router: token gate,
//! multipart intake, folder resolution, object upload and sharing, record
//! persistence.

mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use serde_json::Value;

use common::{create_test_app, create_test_app_with_limit, VALID_TOKEN};
use studyshare::{ResourceFilter, ResourceStore};

/// Multipart form for a complete upload request.
fn upload_form() -> MultipartForm {
    MultipartForm::new()
        .add_text("title", "DBMS Notes")
        .add_text("college", "IIT Delhi")
        .add_text("category", "Engineering & Technology")
        .add_text("course", "B.Tech Computer Science")
        .add_text("semester", "3")
        .add_part(
            "file",
            Part::bytes(b"%PDF-1.4 test".as_slice())
                .file_name("dbms-notes.pdf")
                .mime_type("application/pdf"),
        )
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Object id embedded in a memory-store view link.
fn object_id_from_link(link: &str) -> &str {
    link.rsplit('/').nth(1).expect("link contains an object id")
}

#[tokio::test]
async fn test_upload_success() {
    let app = create_test_app();

    let response = app
        .server
        .post("/upload")
        .add_header(AUTHORIZATION, bearer(VALID_TOKEN))
        .multipart(upload_form())
        .await;

    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    let link = body["link"].as_str().unwrap();
    assert!(link.starts_with("https://"));

    // One record, classification fields intact, counters at zero.
    let records = app.resources.query(&ResourceFilter::default()).await.unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.title, "DBMS Notes");
    assert_eq!(record.subject, "DBMS Notes");
    assert_eq!(record.college, "IIT Delhi");
    assert_eq!(record.category, "Engineering & Technology");
    assert_eq!(record.course, "B.Tech Computer Science");
    assert_eq!(record.semester, "3");
    assert_eq!(record.link, link);
    assert_eq!(record.uploader_id, "uid-1");
    assert_eq!(record.uploader_name, "Asha");
    assert_eq!(record.uploader_email, "asha@example.com");
    assert_eq!(record.download_count, 0);
    assert_eq!(record.read_count, 0);

    // The object exists and is publicly readable.
    assert_eq!(app.objects.uploads(), 1);
    assert_eq!(app.objects.object_count(), 1);
    assert!(app.objects.object_is_public(object_id_from_link(link)));

    // Four folder levels were created: College / Course / Sem_3 / Subject.
    assert_eq!(app.objects.folder_count(), 4);
}

#[tokio::test]
async fn test_upload_reuses_existing_folders() {
    let app = create_test_app();

    for _ in 0..2 {
        let response = app
            .server
            .post("/upload")
            .add_header(AUTHORIZATION, bearer(VALID_TOKEN))
            .multipart(upload_form())
            .await;
        response.assert_status_ok();
    }

    // Second upload resolved the same chain instead of duplicating it.
    assert_eq!(app.objects.folder_count(), 4);
    assert_eq!(app.objects.object_count(), 2);
}

#[tokio::test]
async fn test_upload_without_token_creates_nothing() {
    let app = create_test_app();

    let response = app.server.post("/upload").multipart(upload_form()).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Unauthorized"));

    // The gate fired before any store call.
    assert_eq!(app.objects.folder_lookups(), 0);
    assert_eq!(app.objects.folder_count(), 0);
    assert_eq!(app.objects.object_count(), 0);
    let records = app.resources.query(&ResourceFilter::default()).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_upload_with_invalid_token_rejected() {
    let app = create_test_app();

    let response = app
        .server
        .post("/upload")
        .add_header(AUTHORIZATION, bearer("forged-token"))
        .multipart(upload_form())
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(app.objects.folder_lookups(), 0);
}

#[tokio::test]
async fn test_upload_without_file_part_rejected() {
    let app = create_test_app();

    let form = MultipartForm::new()
        .add_text("title", "DBMS Notes")
        .add_text("college", "IIT Delhi")
        .add_text("category", "Engineering & Technology")
        .add_text("course", "B.Tech Computer Science")
        .add_text("semester", "3");

    let response = app
        .server
        .post("/upload")
        .add_header(AUTHORIZATION, bearer(VALID_TOKEN))
        .multipart(form)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);

    assert_eq!(app.objects.folder_count(), 0);
}

#[tokio::test]
async fn test_upload_missing_field_rejected() {
    let app = create_test_app();

    let form = MultipartForm::new()
        .add_text("title", "DBMS Notes")
        .add_text("college", "IIT Delhi")
        .add_text("category", "Engineering & Technology")
        .add_text("course", "B.Tech Computer Science")
        .add_part(
            "file",
            Part::bytes(b"%PDF-1.4".as_slice())
                .file_name("notes.pdf")
                .mime_type("application/pdf"),
        );

    let response = app
        .server
        .post("/upload")
        .add_header(AUTHORIZATION, bearer(VALID_TOKEN))
        .multipart(form)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("semester"));
}

#[tokio::test]
async fn test_upload_repeated_field_first_wins() {
    let app = create_test_app();

    let form = upload_form().add_text("title", "Second Title");

    let response = app
        .server
        .post("/upload")
        .add_header(AUTHORIZATION, bearer(VALID_TOKEN))
        .multipart(form)
        .await;

    response.assert_status_ok();

    let records = app.resources.query(&ResourceFilter::default()).await.unwrap();
    assert_eq!(records[0].title, "DBMS Notes");
}

#[tokio::test]
async fn test_upload_share_failure_is_reported() {
    let app = create_test_app();
    app.objects.set_fail_share(true);

    let response = app
        .server
        .post("/upload")
        .add_header(AUTHORIZATION, bearer(VALID_TOKEN))
        .multipart(upload_form())
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Upload failed");

    // The orphaned object stays behind, but no record points at it.
    assert_eq!(app.objects.object_count(), 1);
    let records = app.resources.query(&ResourceFilter::default()).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_upload_too_large_rejected() {
    let app = create_test_app_with_limit(1024);

    let form = MultipartForm::new()
        .add_text("title", "DBMS Notes")
        .add_text("college", "IIT Delhi")
        .add_text("category", "Engineering & Technology")
        .add_text("course", "B.Tech Computer Science")
        .add_text("semester", "3")
        .add_part(
            "file",
            Part::bytes(vec![0u8; 2048])
                .file_name("big.pdf")
                .mime_type("application/pdf"),
        );

    let response = app
        .server
        .post("/upload")
        .add_header(AUTHORIZATION, bearer(VALID_TOKEN))
        .multipart(form)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(app.objects.object_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_uploads_same_new_path() {
    let app = create_test_app();

    let first = app
        .server
        .post("/upload")
        .add_header(AUTHORIZATION, bearer(VALID_TOKEN))
        .multipart(upload_form());
    let second = app
        .server
        .post("/upload")
        .add_header(AUTHORIZATION, bearer(VALID_TOKEN))
        .multipart(upload_form());

    let (first, second) = tokio::join!(first, second);

    // Neither request fails because of the other's concurrent folder
    // creation; duplicate sibling folders are the accepted bound.
    first.assert_status_ok();
    second.assert_status_ok();

    let records = app.resources.query(&ResourceFilter::default()).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(app.objects.object_count(), 2);
    assert!(app.objects.folder_count() >= 4);
    assert!(app.objects.folder_count() <= 8);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app.server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}
