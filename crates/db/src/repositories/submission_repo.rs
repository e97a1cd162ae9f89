//! Repository for the `submissions` table.

use intake_core::types::DbId;

use crate::models::submission::{CreateSubmission, Submission};
use crate::DbPool;

/// Column list for `submissions` queries.
const COLUMNS: &str = "\
    id, company_name, company_address, company_postal_code, company_city, \
    contact_name, contact_position, contact_email, contact_phone, contact_fax, \
    direct_phone, direct_fax, direct_email, \
    student_first_name, student_last_name, \
    positions_count, internship_title, internship_description, \
    internship_requirements, internship_start_date, internship_duration, \
    topic_1, topic_2, topic_3, \
    wants_meeting, cannot_accept, signature_location, \
    is_approved, created_at, updated_at";

/// Provides create and read operations for submissions.
///
/// There is deliberately no update or delete: submissions are immutable once
/// stored, apart from the `updated_at` trigger.
pub struct SubmissionRepo;

impl SubmissionRepo {
    /// Insert a new submission in its own transaction, returning the full row.
    ///
    /// `created_at` and `updated_at` take the column defaults, so both use
    /// the same clock and precision as the `updated_at` trigger.
    pub async fn create(pool: &DbPool, input: &CreateSubmission) -> Result<Submission, sqlx::Error> {
        let query = format!(
            "INSERT INTO submissions \
                (company_name, company_address, company_postal_code, company_city, \
                 contact_name, contact_position, contact_email, contact_phone, contact_fax, \
                 direct_phone, direct_fax, direct_email, \
                 student_first_name, student_last_name, \
                 positions_count, internship_title, internship_description, \
                 internship_requirements, internship_start_date, internship_duration, \
                 topic_1, topic_2, topic_3, \
                 wants_meeting, cannot_accept, signature_location) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, \
                     $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26) \
             RETURNING {COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        let row = sqlx::query_as::<_, Submission>(&query)
            .bind(&input.company_name)
            .bind(&input.company_address)
            .bind(&input.company_postal_code)
            .bind(&input.company_city)
            .bind(&input.contact_name)
            .bind(&input.contact_position)
            .bind(&input.contact_email)
            .bind(&input.contact_phone)
            .bind(&input.contact_fax)
            .bind(&input.direct_phone)
            .bind(&input.direct_fax)
            .bind(&input.direct_email)
            .bind(&input.student_first_name)
            .bind(&input.student_last_name)
            .bind(input.positions_count)
            .bind(&input.internship_title)
            .bind(&input.internship_description)
            .bind(&input.internship_requirements)
            .bind(input.internship_start_date)
            .bind(&input.internship_duration)
            .bind(&input.topic_1)
            .bind(&input.topic_2)
            .bind(&input.topic_3)
            .bind(input.wants_meeting)
            .bind(input.cannot_accept)
            .bind(&input.signature_location)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!(submission_id = row.id, "Submission row inserted");
        Ok(row)
    }

    /// Find a submission by ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Submission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM submissions WHERE id = $1");
        sqlx::query_as::<_, Submission>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every submission, newest first.
    ///
    /// `id` breaks ties between rows created within the same clock tick.
    pub async fn list(pool: &DbPool) -> Result<Vec<Submission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM submissions ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Submission>(&query).fetch_all(pool).await
    }

    /// Total number of stored submissions.
    pub async fn count(pool: &DbPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM submissions")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
