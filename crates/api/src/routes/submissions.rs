//! Routes for the submission pages.
//!
//! Mounted at the root by [`crate::router::build_app_router`].

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::submissions;
use crate::state::AppState;

/// Submission routes.
///
/// ```text
/// GET    /                   -> show_form
/// POST   /submit             -> submit_form
/// GET    /success/{id}       -> show_success
/// GET    /forms              -> list_forms
/// GET    /forms/{id}         -> show_detail
/// GET    /download_pdf/{id}  -> download_pdf
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(submissions::show_form))
        .route("/submit", post(submissions::submit_form))
        .route("/success/{id}", get(submissions::show_success))
        .route("/forms", get(submissions::list_forms))
        .route("/forms/{id}", get(submissions::show_detail))
        .route("/download_pdf/{id}", get(submissions::download_pdf))
}
