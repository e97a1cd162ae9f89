//! Render stored submissions into the paper internship-request PDF.
//!
//! [`mapping`] holds the attribute -> template field table, [`filler`] writes
//! values into an AcroForm, and [`PdfRenderer`] ties both to files on disk.
//! All I/O here is blocking; async callers run it on the blocking pool.

pub mod filler;
pub mod mapping;
pub mod renderer;
pub mod template;

use std::path::PathBuf;

pub use mapping::{field_values, output_file_name, FieldValue, SubmissionField, FIELD_MAP};
pub use renderer::{ensure_template, read_field_values, write_blank_template, PdfRenderer};
pub use template::blank_template;

/// Any failure while producing a filled document.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("PDF template not found at {}", .0.display())]
    TemplateMissing(PathBuf),

    #[error("PDF document error: {0}")]
    Document(#[from] lopdf::Error),

    #[error("PDF template has no form fields")]
    NoForm,

    #[error("PDF I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF rendering task failed: {0}")]
    Task(String),
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, TimeZone, Utc};
    use intake_db::models::submission::Submission;

    pub fn sample_submission(id: i64, company: &str) -> Submission {
        let created = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap();
        Submission {
            id,
            company_name: company.to_string(),
            company_address: "123 Test Street".into(),
            company_postal_code: Some("12345".into()),
            company_city: Some("Test City".into()),
            contact_name: "John Doe".into(),
            contact_position: "HR Manager".into(),
            contact_email: "john.doe@testcompany.com".into(),
            contact_phone: "123-456-7890".into(),
            contact_fax: None,
            direct_phone: None,
            direct_fax: None,
            direct_email: None,
            student_first_name: Some("Jane".into()),
            student_last_name: Some("Smith".into()),
            positions_count: Some(2),
            internship_title: Some("Software Developer Intern".into()),
            internship_description: None,
            internship_requirements: None,
            internship_start_date: NaiveDate::from_ymd_opt(2023, 6, 1),
            internship_duration: Some("3 months".into()),
            topic_1: Some("Backend services".into()),
            topic_2: None,
            topic_3: None,
            wants_meeting: true,
            cannot_accept: false,
            signature_location: Some("Lyon".into()),
            is_approved: false,
            created_at: created,
            updated_at: created,
        }
    }
}
