//! Server-rendered HTML pages.
//!
//! Every page goes through [`layout`]. The submission form and the detail page
//! are generated from [`intake_core::form::FORM_SECTIONS`], so adding a field
//! to the schema is enough to show it everywhere.

use axum::http::StatusCode;
use intake_core::form::{FieldErrors, FieldKind, FieldSpec, SubmissionForm, FORM_SECTIONS};
use intake_db::models::submission::Submission;
use maud::{html, Markup, DOCTYPE};

// ---------------------------------------------------------------------------
// User-facing messages
// ---------------------------------------------------------------------------

pub const MSG_FIX_ERRORS: &str = "Please correct the errors in the form before submitting.";
pub const MSG_SUBMITTED: &str = "Your internship form has been submitted successfully.";
pub const MSG_PDF_SAVED_BUT_FAILED: &str =
    "Your form was saved, but the PDF document could not be generated. You can try downloading it again later.";
pub const MSG_PDF_DOWNLOAD_FAILED: &str =
    "The PDF document could not be generated. Please try again later.";
pub const MSG_FORM_EXPIRED: &str =
    "Your form session has expired or is invalid. Please review the form and submit it again.";
pub const MSG_EMPTY_LIST: &str = "No internship forms have been submitted yet.";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

// ---------------------------------------------------------------------------
// Flash messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Warning,
    Error,
}

impl FlashKind {
    fn css_class(self) -> &'static str {
        match self {
            Self::Success => "flash-message flash-success",
            Self::Warning => "flash-message flash-warning",
            Self::Error => "flash-message flash-error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: FlashKind::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { kind: FlashKind::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: FlashKind::Error, message: message.into() }
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

fn layout(title: &str, flashes: &[Flash], content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " | Internship Intake" }
                link rel="stylesheet" href="/static/css/style.css";
            }
            body {
                header.no-print {
                    nav {
                        a href="/" { "New Form" }
                        " "
                        a href="/forms" { "Submitted Forms" }
                    }
                }
                main {
                    @for flash in flashes {
                        div class=(flash.kind.css_class()) role="alert" { (flash.message) }
                    }
                    (content)
                }
                footer.no-print {
                    "Internship Intake Portal"
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

fn input_type(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Email => "email",
        FieldKind::Tel => "tel",
        FieldKind::Number => "number",
        FieldKind::Date => "date",
        FieldKind::Text | FieldKind::TextArea | FieldKind::Checkbox => "text",
    }
}

fn field_row(spec: &FieldSpec, form: &SubmissionForm, errors: &FieldErrors) -> Markup {
    let name = spec.name;
    let group_class = if errors.contains(name) {
        "form-group has-error"
    } else {
        "form-group"
    };

    html! {
        div class=(group_class) {
            @match spec.kind {
                FieldKind::Checkbox => {
                    label.checkbox {
                        input type="checkbox" name=(name) value="on" checked[form.checked(name)];
                        " " (spec.label)
                        @if spec.required { span.required { " *" } }
                    }
                }
                FieldKind::TextArea => {
                    label for=(name) { (spec.label) }
                    textarea id=(name) name=(name) rows="3" maxlength=[spec.max_length] {
                        (form.value(name))
                    }
                }
                kind => {
                    label for=(name) {
                        (spec.label)
                        @if spec.required { span.required { " *" } }
                    }
                    input type=(input_type(kind)) id=(name) name=(name)
                        value=(form.value(name))
                        maxlength=[spec.max_length]
                        required[spec.required];
                }
            }
            @if let Some(messages) = errors.get(name) {
                @for message in messages {
                    div.error-message { (message) }
                }
            }
        }
    }
}

/// The data-entry form, optionally redisplaying input and errors.
pub fn form_page(
    form: &SubmissionForm,
    errors: &FieldErrors,
    csrf_token: Option<&str>,
    flashes: &[Flash],
) -> Markup {
    let content = html! {
        h1 { "Internship Recommendation Form" }
        p.lead { "Fields marked with * are required." }
        form.internship-form method="post" action="/submit" {
            @if let Some(token) = csrf_token {
                input type="hidden" name=(intake_core::csrf::FIELD_NAME) value=(token);
            }
            @for section in FORM_SECTIONS {
                fieldset {
                    legend { (section.title) }
                    @for spec in section.fields {
                        (field_row(spec, form, errors))
                    }
                }
            }
            button type="submit" { "Submit Internship Form" }
        }
    };
    layout("Internship Form", flashes, content)
}

// ---------------------------------------------------------------------------
// Submission pages
// ---------------------------------------------------------------------------

/// Confirmation page shown after a successful submission.
pub fn success_page(submission: &Submission, pdf_failed: bool) -> Markup {
    let mut flashes = vec![Flash::success(MSG_SUBMITTED)];
    if pdf_failed {
        flashes.push(Flash::warning(MSG_PDF_SAVED_BUT_FAILED));
    }

    let content = html! {
        h1 { "Submission Successful" }
        p {
            "Thank you, " (submission.contact_name) ". Your request for "
            strong { (submission.company_name) }
            " has been recorded under reference #" (submission.id) "."
        }
        ul.actions {
            li { a href=(format!("/download_pdf/{}", submission.id)) { "Download PDF" } }
            li { a href=(format!("/forms/{}", submission.id)) { "View submission" } }
            li { a href="/" { "Submit another form" } }
        }
    };
    layout("Submission Successful", &flashes, content)
}

/// All submissions, newest first.
pub fn list_page(submissions: &[Submission]) -> Markup {
    let content = html! {
        h1 { "Submitted Internship Forms" }
        @if submissions.is_empty() {
            p.empty { (MSG_EMPTY_LIST) }
        } @else {
            table.submissions {
                thead {
                    tr {
                        th { "#" }
                        th { "Company" }
                        th { "Contact" }
                        th { "Internship" }
                        th { "Submitted" }
                        th {}
                    }
                }
                tbody {
                    @for s in submissions {
                        tr {
                            td { (s.id) }
                            td { (s.company_name) }
                            td { (s.contact_name) " (" (s.contact_email) ")" }
                            td {
                                @if let Some(title) = &s.internship_title {
                                    (title)
                                } @else if let Some(topic) = s.topics().first() {
                                    (topic)
                                }
                            }
                            td { (s.created_at.format(TIMESTAMP_FORMAT).to_string()) }
                            td { a href=(format!("/forms/{}", s.id)) { "View" } }
                        }
                    }
                }
            }
        }
    };
    layout("Submitted Forms", &[], content)
}

/// Display text for one schema field of a stored submission.
fn display_value(s: &Submission, name: &str) -> Option<String> {
    let text = |v: &Option<String>| v.clone();
    let yes_no = |b: bool| Some(if b { "Yes" } else { "No" }.to_string());
    match name {
        "company_name" => Some(s.company_name.clone()),
        "company_address" => Some(s.company_address.clone()),
        "company_postal_code" => text(&s.company_postal_code),
        "company_city" => text(&s.company_city),
        "contact_name" => Some(s.contact_name.clone()),
        "contact_position" => Some(s.contact_position.clone()),
        "contact_email" => Some(s.contact_email.clone()),
        "contact_phone" => Some(s.contact_phone.clone()),
        "contact_fax" => text(&s.contact_fax),
        "direct_phone" => text(&s.direct_phone),
        "direct_fax" => text(&s.direct_fax),
        "direct_email" => text(&s.direct_email),
        "student_first_name" => text(&s.student_first_name),
        "student_last_name" => text(&s.student_last_name),
        "positions_count" => s.positions_count.map(|n| n.to_string()),
        "internship_title" => text(&s.internship_title),
        "internship_description" => text(&s.internship_description),
        "internship_requirements" => text(&s.internship_requirements),
        "internship_start_date" => s
            .internship_start_date
            .map(|d| d.format(intake_core::form::DATE_FORMAT).to_string()),
        "internship_duration" => text(&s.internship_duration),
        "topic_1" => text(&s.topic_1),
        "topic_2" => text(&s.topic_2),
        "topic_3" => text(&s.topic_3),
        "wants_meeting" => yes_no(s.wants_meeting),
        "cannot_accept" => yes_no(s.cannot_accept),
        "signature_location" => text(&s.signature_location),
        // Only submissions with consent are ever stored.
        "agree_to_terms" => yes_no(true),
        _ => None,
    }
}

/// One submission in full.
pub fn detail_page(submission: &Submission, flashes: &[Flash]) -> Markup {
    let content = html! {
        h1 { (submission.company_name) }
        p.meta {
            "Reference #" (submission.id)
            " | Submitted " (submission.created_at.format(TIMESTAMP_FORMAT).to_string())
            " | Last updated " (submission.updated_at.format(TIMESTAMP_FORMAT).to_string())
            " | Status: " (if submission.is_approved { "Approved" } else { "Pending" })
        }
        @for section in FORM_SECTIONS {
            section {
                h2 { (section.title) }
                dl {
                    @for spec in section.fields {
                        dt { (spec.label) }
                        dd {
                            @match display_value(submission, spec.name) {
                                Some(value) => { (value) }
                                None => { span.muted { "Not provided" } }
                            }
                        }
                    }
                }
            }
        }
        ul.actions.no-print {
            li { a href=(format!("/download_pdf/{}", submission.id)) { "Download PDF" } }
            li { a href="/forms" { "Back to list" } }
        }
    };
    layout(&submission.company_name, flashes, content)
}

// ---------------------------------------------------------------------------
// Error pages
// ---------------------------------------------------------------------------

/// Generic page for an error status. Never includes error details.
pub fn error_page(status: StatusCode) -> Markup {
    let (title, message) = match status {
        StatusCode::NOT_FOUND => (
            "Page Not Found",
            "The page you are looking for does not exist.",
        ),
        StatusCode::BAD_REQUEST => (
            "Bad Request",
            "The request could not be processed. Please reload the form and try again.",
        ),
        StatusCode::REQUEST_TIMEOUT => (
            "Request Timeout",
            "The request took too long to complete. Please try again.",
        ),
        _ => (
            "Internal Server Error",
            "Something went wrong on our side. Please try again later.",
        ),
    };

    let content = html! {
        h1 { (title) }
        p { (message) }
        p { a href="/" { "Back to the form" } }
    };
    layout(title, &[], content)
}
