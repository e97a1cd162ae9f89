use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use intake_core::error::CoreError;

use crate::views;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to render the matching HTML error page; the
/// underlying cause is logged, never shown.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `intake_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No route or resource matches the request path.
    #[error("Page not found")]
    PageNotFound,

    /// The request body could not be read as a form submission.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Core(CoreError::NotFound { entity, id }) => {
                tracing::debug!(entity, id, "Entity not found");
                StatusCode::NOT_FOUND
            }
            AppError::Core(CoreError::Validation(msg)) => {
                tracing::debug!(error = %msg, "Rejected request");
                StatusCode::BAD_REQUEST
            }
            AppError::PageNotFound => StatusCode::NOT_FOUND,
            AppError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::BadRequest(msg) => {
                tracing::warn!(error = %msg, "Malformed request");
                StatusCode::BAD_REQUEST
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Html(views::error_page(status).into_string())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, String) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn not_found_variants_map_to_404() {
        let missing = CoreError::NotFound { entity: "Submission", id: 9 };
        for err in [
            AppError::Core(missing),
            AppError::PageNotFound,
            AppError::Database(sqlx::Error::RowNotFound),
        ] {
            let (status, body) = render(err).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert!(body.contains("Page Not Found"));
        }
    }

    #[tokio::test]
    async fn validation_maps_to_400() {
        let (status, _) = render(AppError::Core(CoreError::Validation("bad".into()))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bad_request_hides_its_cause() {
        let (status, body) =
            render(AppError::BadRequest("duplicate field `wants_meeting`".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Bad Request"));
        assert!(!body.contains("duplicate field"));
    }

    #[tokio::test]
    async fn database_errors_hide_their_cause() {
        let (status, body) = render(AppError::Database(sqlx::Error::Protocol(
            "disk on fire at /var/secret".into(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("Internal Server Error"));
        assert!(!body.contains("/var/secret"));
    }
}
