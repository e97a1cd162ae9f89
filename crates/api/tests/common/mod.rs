use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

use intake_api::config::ServerConfig;
use intake_api::router::build_app_router;
use intake_api::state::AppState;

/// Build a test `ServerConfig` rooted in `dir`.
///
/// Testing environment (anti-forgery check off), the template and output
/// directory inside `dir`, and the repository stylesheet directory.
pub fn test_config(dir: &Path) -> ServerConfig {
    let mut config = ServerConfig::from_lookup(|key| match key {
        "APP_ENV" => Some("testing".to_string()),
        "SECRET_KEY" => Some("test-secret".to_string()),
        _ => None,
    });
    config.pdf_template_path = dir.join("template.pdf");
    config.pdf_output_dir = dir.join("generated_pdfs");
    config.static_dir = PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../static"));
    config
}

/// Build the full application router for `config`.
pub fn build_app(pool: SqlitePool, config: ServerConfig) -> Router {
    build_app_router(AppState::new(pool, config))
}

/// Build the application with a blank PDF template written into `dir`.
///
/// This uses the same router construction as `main.rs`, so integration tests
/// exercise the production middleware stack.
pub fn build_test_app(pool: SqlitePool, dir: &Path) -> Router {
    let config = test_config(dir);
    intake_pdf::write_blank_template(&config.pdf_template_path).unwrap();
    build_app(pool, config)
}

/// A complete, valid submission with the required fields, one topic and consent.
pub fn valid_form() -> Vec<(&'static str, &'static str)> {
    vec![
        ("company_name", "Test Company"),
        ("company_address", "123 Test Street"),
        ("contact_name", "John Doe"),
        ("contact_position", "HR Manager"),
        ("contact_email", "john.doe@testcompany.com"),
        ("contact_phone", "+1234567890"),
        ("topic_1", "Web Development"),
        ("wants_meeting", "on"),
        ("agree_to_terms", "on"),
    ]
}

/// Replace (or add) one field of a form payload.
pub fn with_field(
    mut form: Vec<(&'static str, &'static str)>,
    name: &'static str,
    value: &'static str,
) -> Vec<(&'static str, &'static str)> {
    form.retain(|(n, _)| *n != name);
    form.push((name, value));
    form
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_form(app: Router, uri: &str, form: &[(&str, &str)]) -> Response {
    let body = serde_urlencoded::to_string(form).unwrap();
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// The `Location` header of a redirect.
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without Location")
        .to_str()
        .unwrap()
        .to_string()
}

/// Id at the end of a `/success/{id}` location, ignoring any query.
pub fn id_from_location(location: &str) -> i64 {
    location
        .trim_start_matches("/success/")
        .split('?')
        .next()
        .unwrap()
        .parse()
        .unwrap()
}
