//! Handlers for the internship submission pages.
//!
//! Every response is server-rendered HTML except the PDF download. PDF
//! failures never surface as errors here: they become notices on the next
//! page.

use axum::extract::rejection::FormRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use intake_core::error::CoreError;
use intake_core::form::{FieldErrors, SubmissionForm};
use intake_core::types::DbId;
use intake_db::models::submission::Submission;
use intake_db::repositories::SubmissionRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::views::{self, Flash};
use crate::workflow::{self, Persisted, Rendered};

/// Query value marking a degraded success on `/success/{id}`.
const PDF_FAILED: &str = "failed";
/// Query value marking a failed download on `/forms/{id}`.
const NOTICE_PDF_ERROR: &str = "pdf_error";

/// A `302 Found` redirect (`Redirect::to` answers 303).
fn found(location: &str) -> Response {
    let mut response = StatusCode::FOUND.into_response();
    if let Ok(value) = HeaderValue::from_str(location) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
}

/// Parse a path id; anything that is not an integer is an unknown page.
fn parse_id(raw: &str) -> AppResult<DbId> {
    raw.parse().map_err(|_| AppError::PageNotFound)
}

async fn load(state: &AppState, id: DbId) -> AppResult<Submission> {
    SubmissionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Submission",
            id,
        }))
}

fn issue_token(state: &AppState) -> Option<String> {
    state.config.csrf_enabled.then(|| state.csrf.issue())
}

fn html(markup: maud::Markup) -> Html<String> {
    Html(markup.into_string())
}

// ---------------------------------------------------------------------------
// GET /
// ---------------------------------------------------------------------------

/// Show an empty submission form.
pub async fn show_form(State(state): State<AppState>) -> Html<String> {
    let token = issue_token(&state);
    html(views::form_page(
        &SubmissionForm::default(),
        &FieldErrors::new(),
        token.as_deref(),
        &[],
    ))
}

// ---------------------------------------------------------------------------
// POST /submit
// ---------------------------------------------------------------------------

/// Validate, store, and render a submission.
///
/// Invalid input redisplays the form with 200; a bad anti-forgery token
/// redisplays it with 400; an unreadable body gets the 400 page. Nothing is
/// stored in any of these cases.
pub async fn submit_form(
    State(state): State<AppState>,
    form: Result<Form<SubmissionForm>, FormRejection>,
) -> AppResult<Response> {
    let Form(form) = form.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    if state.config.csrf_enabled {
        if let Err(err) = state.csrf.verify(&form.csrf_token) {
            tracing::warn!(error = %err, "Submission rejected: bad anti-forgery token");
            let token = issue_token(&state);
            let page = views::form_page(
                &form,
                &FieldErrors::new(),
                token.as_deref(),
                &[Flash::error(views::MSG_FORM_EXPIRED)],
            );
            return Ok((StatusCode::BAD_REQUEST, html(page)).into_response());
        }
    }

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            tracing::debug!(fields = errors.len(), "Submission failed validation");
            let token = issue_token(&state);
            let page = views::form_page(
                &form,
                &errors,
                token.as_deref(),
                &[Flash::error(views::MSG_FIX_ERRORS)],
            );
            return Ok(html(page).into_response());
        }
    };

    let Persisted(submission) = workflow::persist(&state.pool, &input).await?;

    let location = match workflow::render(&state.pdf, &submission, state.pdf_timeout).await {
        Rendered::Ready(_) => format!("/success/{}", submission.id),
        Rendered::Failed(_) => format!("/success/{}?pdf={PDF_FAILED}", submission.id),
    };
    Ok(found(&location))
}

// ---------------------------------------------------------------------------
// GET /success/{id}
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct SuccessQuery {
    pub pdf: Option<String>,
}

/// Confirmation page for a stored submission.
pub async fn show_success(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<SuccessQuery>,
) -> AppResult<Html<String>> {
    let submission = load(&state, parse_id(&id)?).await?;
    let pdf_failed = query.pdf.as_deref() == Some(PDF_FAILED);
    Ok(html(views::success_page(&submission, pdf_failed)))
}

// ---------------------------------------------------------------------------
// GET /forms
// ---------------------------------------------------------------------------

/// Every submission, newest first.
pub async fn list_forms(State(state): State<AppState>) -> AppResult<Html<String>> {
    let submissions = SubmissionRepo::list(&state.pool).await?;
    Ok(html(views::list_page(&submissions)))
}

// ---------------------------------------------------------------------------
// GET /forms/{id}
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct DetailQuery {
    pub notice: Option<String>,
}

/// One submission in full.
pub async fn show_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DetailQuery>,
) -> AppResult<Html<String>> {
    let submission = load(&state, parse_id(&id)?).await?;

    let mut flashes = Vec::new();
    if query.notice.as_deref() == Some(NOTICE_PDF_ERROR) {
        flashes.push(Flash::error(views::MSG_PDF_DOWNLOAD_FAILED));
    }
    Ok(html(views::detail_page(&submission, &flashes)))
}

// ---------------------------------------------------------------------------
// GET /download_pdf/{id}
// ---------------------------------------------------------------------------

/// Regenerate the document and send it as an attachment.
///
/// A render failure redirects to the detail page with a notice.
pub async fn download_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let submission = load(&state, parse_id(&id)?).await?;

    match workflow::render_bytes(&state.pdf, &submission, state.pdf_timeout).await {
        Ok((file_name, bytes)) => {
            tracing::info!(
                submission_id = submission.id,
                file = %file_name,
                size = bytes.len(),
                "PDF download",
            );
            let disposition = format!("attachment; filename=\"{file_name}\"");
            Ok((
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response())
        }
        Err(err) => {
            tracing::warn!(
                submission_id = submission.id,
                error = %err,
                "PDF download failed",
            );
            Ok(found(&format!(
                "/forms/{}?notice={NOTICE_PDF_ERROR}",
                submission.id
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// Any unmatched route.
pub async fn not_found() -> AppError {
    AppError::PageNotFound
}
