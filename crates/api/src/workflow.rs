//! Submission lifecycle: store the record, then render its document.
//!
//! The two steps report separate outcomes. A stored submission is never
//! rolled back because its PDF could not be produced. Renders run on the
//! blocking pool under a time limit shorter than the request timeout.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use intake_db::models::submission::{CreateSubmission, Submission};
use intake_db::repositories::SubmissionRepo;
use intake_db::DbPool;
use intake_pdf::{PdfError, PdfRenderer};

/// A submission that has been committed to the database.
#[derive(Debug, Clone)]
pub struct Persisted(pub Submission);

/// Outcome of the best-effort render step.
#[derive(Debug)]
pub enum Rendered {
    Ready(PathBuf),
    Failed(PdfError),
}

impl Rendered {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Insert a validated submission.
pub async fn persist(pool: &DbPool, input: &CreateSubmission) -> Result<Persisted, sqlx::Error> {
    let submission = SubmissionRepo::create(pool, input).await?;
    tracing::info!(
        submission_id = submission.id,
        company = %submission.company_name,
        "Submission stored",
    );
    Ok(Persisted(submission))
}

/// Run `task` on the blocking pool, giving up after `limit`.
///
/// A task that outlives `limit` keeps running in the background; its result
/// is discarded.
async fn bounded<T, F>(limit: Duration, task: F) -> Result<T, PdfError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PdfError> + Send + 'static,
{
    match tokio::time::timeout(limit, tokio::task::spawn_blocking(task)).await {
        Ok(joined) => joined.map_err(|e| PdfError::Task(e.to_string()))?,
        Err(_) => Err(PdfError::Task(format!(
            "render timed out after {} ms",
            limit.as_millis()
        ))),
    }
}

/// Render the document for `submission`, waiting at most `limit`.
///
/// Failures (including the time limit) are logged at `warn` and returned as
/// [`Rendered::Failed`].
pub async fn render(
    renderer: &Arc<PdfRenderer>,
    submission: &Submission,
    limit: Duration,
) -> Rendered {
    let renderer = Arc::clone(renderer);
    let owned = submission.clone();

    match bounded(limit, move || renderer.render(&owned)).await {
        Ok(path) => Rendered::Ready(path),
        Err(err) => {
            tracing::warn!(
                submission_id = submission.id,
                error = %err,
                "PDF generation failed",
            );
            Rendered::Failed(err)
        }
    }
}

/// Render within `limit` and return `(file_name, bytes)`.
pub async fn render_bytes(
    renderer: &Arc<PdfRenderer>,
    submission: &Submission,
    limit: Duration,
) -> Result<(String, Vec<u8>), PdfError> {
    let renderer = Arc::clone(renderer);
    let owned = submission.clone();

    bounded(limit, move || renderer.render_to_bytes(&owned)).await
}
