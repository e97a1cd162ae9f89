//! Submission entity model.
//!
//! The insert DTO is [`intake_core::form::CreateSubmission`], produced by form
//! validation; it is re-exported here so callers can stay on the db crate.

use chrono::NaiveDate;
use intake_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

pub use intake_core::form::CreateSubmission;

/// A row from the `submissions` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Submission {
    pub id: DbId,

    pub company_name: String,
    pub company_address: String,
    pub company_postal_code: Option<String>,
    pub company_city: Option<String>,

    pub contact_name: String,
    pub contact_position: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub contact_fax: Option<String>,

    pub direct_phone: Option<String>,
    pub direct_fax: Option<String>,
    pub direct_email: Option<String>,

    pub student_first_name: Option<String>,
    pub student_last_name: Option<String>,

    pub positions_count: Option<i64>,
    pub internship_title: Option<String>,
    pub internship_description: Option<String>,
    pub internship_requirements: Option<String>,
    pub internship_start_date: Option<NaiveDate>,
    pub internship_duration: Option<String>,
    pub topic_1: Option<String>,
    pub topic_2: Option<String>,
    pub topic_3: Option<String>,

    pub wants_meeting: bool,
    pub cannot_accept: bool,
    pub signature_location: Option<String>,

    pub is_approved: bool,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Submission {
    /// Non-empty topics in order.
    pub fn topics(&self) -> Vec<&str> {
        [&self.topic_1, &self.topic_2, &self.topic_3]
            .into_iter()
            .filter_map(|t| t.as_deref())
            .collect()
    }
}
