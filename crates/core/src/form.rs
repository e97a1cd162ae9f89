//! Internship request form schema and validation.
//!
//! [`SubmissionForm`] is the raw payload exactly as posted by the browser:
//! every field is a string and absent fields default to empty. Calling
//! [`SubmissionForm::validate`] normalises it (trim, empty optional -> `None`),
//! parses the numeric and date fields, and runs the declarative rules on
//! [`CreateSubmission`]. The outcome is either a typed record ready to insert
//! or a [`FieldErrors`] map; malformed input never produces anything else.
//!
//! [`FORM_SECTIONS`] describes the same fields for rendering, so the HTML form
//! and the rules cannot drift apart on names or required flags.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_NOT_A_NUMBER: &str = "Please enter a whole number.";
pub const MSG_MUST_AGREE: &str = "You must agree to the terms to submit the form.";
pub const MSG_BAD_DATE: &str = "Please enter a valid date (YYYY-MM-DD).";

/// Date format accepted by `internship_start_date` (HTML `<input type=date>`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Checkbox values treated as "checked". Anything else, or absence, is false.
const TRUTHY: &[&str] = &["on", "y", "yes", "true", "1"];

// ---------------------------------------------------------------------------
// Field schema (drives the HTML form)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Number,
    Date,
    TextArea,
    Checkbox,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSection {
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
}

const fn field(
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
    required: bool,
    max_length: Option<usize>,
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind,
        required,
        max_length,
    }
}

use FieldKind::{Checkbox, Date, Email, Number, Tel, Text, TextArea};

/// Form layout, in the order of the paper document.
pub const FORM_SECTIONS: &[FieldSection] = &[
    FieldSection {
        title: "Company",
        fields: &[
            field("company_name", "Company Name", Text, true, Some(100)),
            field("company_address", "Company Address", Text, true, Some(200)),
            field("company_postal_code", "Postal Code", Text, false, Some(20)),
            field("company_city", "City", Text, false, Some(50)),
        ],
    },
    FieldSection {
        title: "Contact Person",
        fields: &[
            field("contact_name", "Contact Person Name", Text, true, Some(100)),
            field("contact_position", "Position/Role", Text, true, Some(100)),
            field("contact_email", "Email", Email, true, Some(100)),
            field("contact_phone", "Phone Number", Tel, true, Some(20)),
            field("contact_fax", "Fax Number", Tel, false, Some(20)),
        ],
    },
    FieldSection {
        title: "Direct Line",
        fields: &[
            field("direct_phone", "Direct Phone", Tel, false, Some(20)),
            field("direct_fax", "Direct Fax", Tel, false, Some(20)),
            field("direct_email", "Direct Email", Email, false, Some(100)),
        ],
    },
    FieldSection {
        title: "Student",
        fields: &[
            field("student_first_name", "Student First Name", Text, false, Some(100)),
            field("student_last_name", "Student Last Name", Text, false, Some(100)),
        ],
    },
    FieldSection {
        title: "Internship",
        fields: &[
            field("positions_count", "Number of Open Positions", Number, false, None),
            field("internship_title", "Internship Title/Topic", Text, false, Some(200)),
            field("internship_description", "Internship Description", TextArea, false, None),
            field("internship_requirements", "Requirements for Interns", TextArea, false, None),
            field("internship_start_date", "Proposed Start Date", Date, false, None),
            field("internship_duration", "Expected Duration", Text, false, Some(50)),
            field("topic_1", "Topic 1", TextArea, false, Some(500)),
            field("topic_2", "Topic 2", TextArea, false, Some(500)),
            field("topic_3", "Topic 3", TextArea, false, Some(500)),
        ],
    },
    FieldSection {
        title: "Preferences",
        fields: &[
            field("wants_meeting", "We would like to meet the student beforehand", Checkbox, false, None),
            field("cannot_accept", "We cannot accept an intern this year", Checkbox, false, None),
            field("signature_location", "Signed at", Text, false, Some(100)),
        ],
    },
    FieldSection {
        title: "Confirmation",
        fields: &[field(
            "agree_to_terms",
            "I agree that this information can be shared with students",
            Checkbox,
            true,
            None,
        )],
    },
];

/// Iterate every field of [`FORM_SECTIONS`] in layout order.
pub fn all_fields() -> impl Iterator<Item = &'static FieldSpec> {
    FORM_SECTIONS.iter().flat_map(|s| s.fields.iter())
}

// ---------------------------------------------------------------------------
// Field errors
// ---------------------------------------------------------------------------

/// Field name -> human-readable messages, for redisplaying the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one error.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

// ---------------------------------------------------------------------------
// Validated record
// ---------------------------------------------------------------------------

/// A validated submission, ready to be inserted.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct CreateSubmission {
    #[validate(length(min = 2, max = 100, message = "Company name must be between 2 and 100 characters."))]
    pub company_name: String,
    #[validate(length(min = 5, max = 200, message = "Address must be between 5 and 200 characters."))]
    pub company_address: String,
    #[validate(length(max = 20, message = "Postal code must be at most 20 characters."))]
    pub company_postal_code: Option<String>,
    #[validate(length(max = 50, message = "City name must be at most 50 characters."))]
    pub company_city: Option<String>,

    #[validate(length(min = 2, max = 100, message = "Contact name must be between 2 and 100 characters."))]
    pub contact_name: String,
    #[validate(length(min = 2, max = 100, message = "Position must be between 2 and 100 characters."))]
    pub contact_position: String,
    #[validate(
        email(message = "Please enter a valid email address."),
        length(max = 100, message = "Email must be at most 100 characters.")
    )]
    pub contact_email: String,
    #[validate(length(min = 8, max = 20, message = "Phone number must be between 8 and 20 characters."))]
    pub contact_phone: String,
    #[validate(length(max = 20, message = "Fax number must be at most 20 characters."))]
    pub contact_fax: Option<String>,

    #[validate(length(max = 20, message = "Phone number must be at most 20 characters."))]
    pub direct_phone: Option<String>,
    #[validate(length(max = 20, message = "Fax number must be at most 20 characters."))]
    pub direct_fax: Option<String>,
    #[validate(
        email(message = "Please enter a valid email address."),
        length(max = 100, message = "Email must be at most 100 characters.")
    )]
    pub direct_email: Option<String>,

    #[validate(length(max = 100, message = "First name must be at most 100 characters."))]
    pub student_first_name: Option<String>,
    #[validate(length(max = 100, message = "Last name must be at most 100 characters."))]
    pub student_last_name: Option<String>,

    #[validate(range(min = 1, max = 1000, message = "Number of positions must be between 1 and 1000."))]
    pub positions_count: Option<i64>,
    #[validate(length(min = 5, max = 200, message = "Title must be between 5 and 200 characters."))]
    pub internship_title: Option<String>,
    #[validate(length(min = 20, message = "Please provide a detailed description (minimum 20 characters)."))]
    pub internship_description: Option<String>,
    pub internship_requirements: Option<String>,
    pub internship_start_date: Option<NaiveDate>,
    #[validate(length(max = 50, message = "Duration must be at most 50 characters."))]
    pub internship_duration: Option<String>,

    #[validate(length(max = 500, message = "Topic must be at most 500 characters."))]
    pub topic_1: Option<String>,
    #[validate(length(max = 500, message = "Topic must be at most 500 characters."))]
    pub topic_2: Option<String>,
    #[validate(length(max = 500, message = "Topic must be at most 500 characters."))]
    pub topic_3: Option<String>,

    pub wants_meeting: bool,
    pub cannot_accept: bool,
    #[validate(length(max = 100, message = "Location must be at most 100 characters."))]
    pub signature_location: Option<String>,
}

// ---------------------------------------------------------------------------
// Raw form payload
// ---------------------------------------------------------------------------

/// The form as posted. Absent fields deserialize to empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubmissionForm {
    pub company_name: String,
    pub company_address: String,
    pub company_postal_code: String,
    pub company_city: String,
    pub contact_name: String,
    pub contact_position: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub contact_fax: String,
    pub direct_phone: String,
    pub direct_fax: String,
    pub direct_email: String,
    pub student_first_name: String,
    pub student_last_name: String,
    pub positions_count: String,
    pub internship_title: String,
    pub internship_description: String,
    pub internship_requirements: String,
    pub internship_start_date: String,
    pub internship_duration: String,
    pub topic_1: String,
    pub topic_2: String,
    pub topic_3: String,
    pub wants_meeting: Option<String>,
    pub cannot_accept: Option<String>,
    pub signature_location: String,
    /// Consent to share the offer with students. Checked, never stored.
    pub agree_to_terms: Option<String>,
    pub csrf_token: String,
}

impl SubmissionForm {
    /// Raw text value of a field by form name, for redisplay.
    ///
    /// Unknown names and checkboxes return an empty string.
    pub fn value(&self, name: &str) -> &str {
        match name {
            "company_name" => &self.company_name,
            "company_address" => &self.company_address,
            "company_postal_code" => &self.company_postal_code,
            "company_city" => &self.company_city,
            "contact_name" => &self.contact_name,
            "contact_position" => &self.contact_position,
            "contact_email" => &self.contact_email,
            "contact_phone" => &self.contact_phone,
            "contact_fax" => &self.contact_fax,
            "direct_phone" => &self.direct_phone,
            "direct_fax" => &self.direct_fax,
            "direct_email" => &self.direct_email,
            "student_first_name" => &self.student_first_name,
            "student_last_name" => &self.student_last_name,
            "positions_count" => &self.positions_count,
            "internship_title" => &self.internship_title,
            "internship_description" => &self.internship_description,
            "internship_requirements" => &self.internship_requirements,
            "internship_start_date" => &self.internship_start_date,
            "internship_duration" => &self.internship_duration,
            "topic_1" => &self.topic_1,
            "topic_2" => &self.topic_2,
            "topic_3" => &self.topic_3,
            "signature_location" => &self.signature_location,
            _ => "",
        }
    }

    /// Whether a checkbox field was ticked.
    pub fn checked(&self, name: &str) -> bool {
        let raw = match name {
            "wants_meeting" => self.wants_meeting.as_deref(),
            "cannot_accept" => self.cannot_accept.as_deref(),
            "agree_to_terms" => self.agree_to_terms.as_deref(),
            _ => None,
        };
        raw.is_some_and(is_truthy)
    }

    /// Validate the payload into a typed record or per-field messages.
    pub fn validate(&self) -> Result<CreateSubmission, FieldErrors> {
        let mut errors = FieldErrors::new();

        for spec in all_fields().filter(|f| f.required) {
            match spec.kind {
                FieldKind::Checkbox if !self.checked(spec.name) => {
                    errors.add(spec.name, MSG_MUST_AGREE);
                }
                FieldKind::Checkbox => {}
                _ if self.value(spec.name).trim().is_empty() => {
                    errors.add(spec.name, MSG_REQUIRED);
                }
                _ => {}
            }
        }

        let positions_count = match optional(&self.positions_count) {
            None => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) => Some(n),
                Err(_) => {
                    errors.add("positions_count", MSG_NOT_A_NUMBER);
                    None
                }
            },
        };

        let internship_start_date = match optional(&self.internship_start_date) {
            None => None,
            Some(raw) => match NaiveDate::parse_from_str(&raw, DATE_FORMAT) {
                Ok(d) => Some(d),
                Err(_) => {
                    errors.add("internship_start_date", MSG_BAD_DATE);
                    None
                }
            },
        };

        let record = CreateSubmission {
            company_name: self.company_name.trim().to_string(),
            company_address: self.company_address.trim().to_string(),
            company_postal_code: optional(&self.company_postal_code),
            company_city: optional(&self.company_city),
            contact_name: self.contact_name.trim().to_string(),
            contact_position: self.contact_position.trim().to_string(),
            contact_email: self.contact_email.trim().to_string(),
            contact_phone: self.contact_phone.trim().to_string(),
            contact_fax: optional(&self.contact_fax),
            direct_phone: optional(&self.direct_phone),
            direct_fax: optional(&self.direct_fax),
            direct_email: optional(&self.direct_email),
            student_first_name: optional(&self.student_first_name),
            student_last_name: optional(&self.student_last_name),
            positions_count,
            internship_title: optional(&self.internship_title),
            internship_description: optional(&self.internship_description),
            internship_requirements: optional(&self.internship_requirements),
            internship_start_date,
            internship_duration: optional(&self.internship_duration),
            topic_1: optional(&self.topic_1),
            topic_2: optional(&self.topic_2),
            topic_3: optional(&self.topic_3),
            wants_meeting: self.checked("wants_meeting"),
            cannot_accept: self.checked("cannot_accept"),
            signature_location: optional(&self.signature_location),
        };

        if let Err(rule_errors) = record.validate() {
            for (field, field_errors) in rule_errors.field_errors() {
                // A missing required value already has the clearer message.
                if errors.contains(&field) {
                    continue;
                }
                for e in field_errors {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({}).", e.code));
                    errors.add(field.to_string(), message);
                }
            }
        }

        if errors.is_empty() {
            Ok(record)
        } else {
            Err(errors)
        }
    }
}

fn optional(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn is_truthy(raw: &str) -> bool {
    TRUTHY.contains(&raw.trim().to_ascii_lowercase().as_str())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
