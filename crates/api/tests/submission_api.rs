//! HTTP-level integration tests for the submission pages.
//!
//! Uses tower::ServiceExt to send requests directly to the router without an
//! actual TCP listener.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{body_bytes, body_text, get, id_from_location, location, post_form, valid_form, with_field};
use intake_db::repositories::SubmissionRepo;
use sqlx::SqlitePool;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn home_page_shows_the_form(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, dir.path());

    let response = get(app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Internship Recommendation Form"));
    assert!(html.contains("name=\"company_name\""));
    assert!(html.contains("action=\"/submit\""));
    // Anti-forgery check is off in the testing environment.
    assert!(!html.contains("name=\"csrf_token\""));
}

// ---------------------------------------------------------------------------
// POST /submit
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn valid_submission_is_stored_and_redirects(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool.clone(), dir.path());

    let response = post_form(app, "/submit", &valid_form()).await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let location = location(&response);
    assert!(location.starts_with("/success/"), "{location}");
    assert!(!location.contains("pdf=failed"));

    let id = id_from_location(&location);
    let stored = SubmissionRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(stored.company_name, "Test Company");
    assert_eq!(stored.contact_email, "john.doe@testcompany.com");
    assert!(stored.wants_meeting);
    assert!(!stored.cannot_accept);
    assert!(!stored.is_approved);

    let pdf = dir
        .path()
        .join("generated_pdfs")
        .join(format!("internship_{id}_test_company.pdf"));
    assert!(pdf.is_file(), "expected {}", pdf.display());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_required_field_redisplays_form(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool.clone(), dir.path());

    let form = with_field(valid_form(), "company_name", "");
    let response = post_form(app, "/submit", &form).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Please correct the errors in the form before submitting."));
    assert!(html.contains("This field is required."));
    // Other input is kept.
    assert!(html.contains("value=\"123 Test Street\""));

    assert_eq!(SubmissionRepo::count(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_email_is_rejected(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool.clone(), dir.path());

    let form = with_field(valid_form(), "contact_email", "not-an-email");
    let response = post_form(app, "/submit", &form).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Please enter a valid email address."));
    assert_eq!(SubmissionRepo::count(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn omitted_optional_fields_are_stored_as_null(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool.clone(), dir.path());

    let form = vec![
        ("company_name", "Minimal Co"),
        ("company_address", "1 Minimal Road"),
        ("contact_name", "Jane Roe"),
        ("contact_position", "CTO"),
        ("contact_email", "jane@minimal.example"),
        ("contact_phone", "0123456789"),
        ("agree_to_terms", "on"),
    ];
    let response = post_form(app, "/submit", &form).await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let id = id_from_location(&location(&response));
    let stored = SubmissionRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(stored.contact_fax, None);
    assert_eq!(stored.direct_email, None);
    assert_eq!(stored.positions_count, None);
    assert_eq!(stored.topic_1, None);
    assert_eq!(stored.internship_start_date, None);
    assert!(!stored.wants_meeting);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_template_still_stores_submission(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let config = common::test_config(dir.path());
    // No template written.
    let app = common::build_app(pool.clone(), config);

    let response = post_form(app.clone(), "/submit", &valid_form()).await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let location = location(&response);
    assert!(location.ends_with("?pdf=failed"), "{location}");
    assert_eq!(SubmissionRepo::count(&pool).await.unwrap(), 1);

    let response = get(app, &location).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Submission Successful"));
    assert!(html.contains("PDF document could not be generated"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unticked_consent_is_rejected(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool.clone(), dir.path());

    let form: Vec<_> = valid_form()
        .into_iter()
        .filter(|(name, _)| *name != "agree_to_terms")
        .collect();
    let response = post_form(app, "/submit", &form).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("You must agree to the terms to submit the form."));
    assert_eq!(SubmissionRepo::count(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicated_field_gets_the_bad_request_page(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool.clone(), dir.path());

    let mut form = valid_form();
    form.push(("wants_meeting", "on"));
    let response = post_form(app, "/submit", &form).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let html = body_text(response).await;
    assert!(html.contains("Bad Request"));
    assert!(!html.contains("duplicate field"));
    assert!(!html.contains("Failed to deserialize"));
    assert_eq!(SubmissionRepo::count(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_form_body_gets_the_bad_request_page(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool.clone(), dir.path());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/submit")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"company_name":"Json Co"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let html = body_text(response).await;
    assert!(html.contains("Bad Request"));
    assert!(!html.contains("Content-Type"));
    assert_eq!(SubmissionRepo::count(&pool).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// GET /success/{id}
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn success_page_confirms_submission(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, dir.path());

    let response = post_form(app.clone(), "/submit", &valid_form()).await;
    let location = location(&response);

    let response = get(app, &location).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Submission Successful"));
    assert!(html.contains("Test Company"));
    assert!(!html.contains("PDF document could not be generated"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_ids_return_404(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, dir.path());

    for uri in ["/success/999", "/forms/999", "/download_pdf/999", "/forms/abc"] {
        let response = get(app.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        let html = body_text(response).await;
        assert!(html.contains("Page Not Found"), "{uri}");
    }
}

// ---------------------------------------------------------------------------
// GET /forms and /forms/{id}
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_list_shows_message(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, dir.path());

    let response = get(app, "/forms").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("No internship forms have been submitted yet."));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_shows_newest_first(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, dir.path());

    let first = with_field(valid_form(), "company_name", "Alpha Industries");
    let second = with_field(valid_form(), "company_name", "Beta Systems");
    post_form(app.clone(), "/submit", &first).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    post_form(app.clone(), "/submit", &second).await;

    let html = body_text(get(app, "/forms").await).await;
    let alpha = html.find("Alpha Industries").expect("alpha listed");
    let beta = html.find("Beta Systems").expect("beta listed");
    assert!(beta < alpha, "newest submission must come first");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn detail_page_round_trips_submission(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, dir.path());

    let form = with_field(valid_form(), "positions_count", "3");
    let response = post_form(app.clone(), "/submit", &form).await;
    let id = id_from_location(&location(&response));

    let response = get(app, &format!("/forms/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Test Company"));
    assert!(html.contains("john.doe@testcompany.com"));
    assert!(html.contains("Web Development"));
    assert!(html.contains(&format!("/download_pdf/{id}")));
    assert!(!html.contains("could not be generated"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn detail_page_shows_pdf_notice(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, dir.path());

    let response = post_form(app.clone(), "/submit", &valid_form()).await;
    let id = id_from_location(&location(&response));

    let html = body_text(get(app, &format!("/forms/{id}?notice=pdf_error")).await).await;
    assert!(html.contains("The PDF document could not be generated. Please try again later."));
}

// ---------------------------------------------------------------------------
// GET /download_pdf/{id}
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn download_returns_pdf_attachment(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, dir.path());

    let response = post_form(app.clone(), "/submit", &valid_form()).await;
    let id = id_from_location(&location(&response));

    let response = get(app, &format!("/download_pdf/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(
        disposition,
        format!("attachment; filename=\"internship_{id}_test_company.pdf\"")
    );

    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"%PDF"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn download_failure_redirects_with_notice(pool: SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let config = common::test_config(dir.path());
    let template = config.pdf_template_path.clone();
    let app = common::build_test_app(pool, dir.path());

    let response = post_form(app.clone(), "/submit", &valid_form()).await;
    let id = id_from_location(&location(&response));

    std::fs::remove_file(&template).unwrap();

    let response = get(app, &format!("/download_pdf/{id}")).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/forms/{id}?notice=pdf_error"));
}
