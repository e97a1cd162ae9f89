//! Submission attribute -> template field name table.
//!
//! The names on the right are the AcroForm field names of the paper
//! internship-request document. Every mapped attribute is written on every
//! render; absent optional values are written as empty text so a regenerated
//! file never keeps stale content.

use deunicode::deunicode_char;
use intake_db::models::submission::Submission;

/// Format used for dates printed on the document.
pub const PRINT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Longest company slug kept in generated file names.
const MAX_SLUG_LEN: usize = 60;

/// A submission attribute that has a place on the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionField {
    CompanyName,
    CompanyAddress,
    CompanyPostalCode,
    CompanyCity,
    ContactName,
    ContactPosition,
    ContactEmail,
    ContactPhone,
    ContactFax,
    DirectPhone,
    DirectFax,
    DirectEmail,
    StudentFirstName,
    StudentLastName,
    PositionsCount,
    InternshipTitle,
    InternshipDescription,
    InternshipRequirements,
    InternshipStartDate,
    InternshipDuration,
    Topic1,
    Topic2,
    Topic3,
    WantsMeeting,
    CannotAccept,
    SignatureLocation,
    SubmittedOn,
}

/// Value written into one template field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Check(bool),
}

/// The fixed attribute -> template field table.
pub const FIELD_MAP: &[(SubmissionField, &str)] = &[
    (SubmissionField::CompanyName, "raison_sociale"),
    (SubmissionField::CompanyAddress, "adresse"),
    (SubmissionField::CompanyPostalCode, "code_postal"),
    (SubmissionField::CompanyCity, "ville"),
    (SubmissionField::ContactName, "nom_responsable"),
    (SubmissionField::ContactPosition, "fonction_responsable"),
    (SubmissionField::ContactEmail, "email"),
    (SubmissionField::ContactPhone, "telephone"),
    (SubmissionField::ContactFax, "fax"),
    (SubmissionField::DirectPhone, "telephone_direct"),
    (SubmissionField::DirectFax, "fax_direct"),
    (SubmissionField::DirectEmail, "email_direct"),
    (SubmissionField::StudentFirstName, "prenom_etudiant"),
    (SubmissionField::StudentLastName, "nom_etudiant"),
    (SubmissionField::PositionsCount, "nombre_stagiaires"),
    (SubmissionField::InternshipTitle, "intitule_stage"),
    (SubmissionField::InternshipDescription, "description_stage"),
    (SubmissionField::InternshipRequirements, "prerequis"),
    (SubmissionField::InternshipStartDate, "date_debut"),
    (SubmissionField::InternshipDuration, "duree"),
    (SubmissionField::Topic1, "sujet_1"),
    (SubmissionField::Topic2, "sujet_2"),
    (SubmissionField::Topic3, "sujet_3"),
    (SubmissionField::WantsMeeting, "souhaite_rencontre"),
    (SubmissionField::CannotAccept, "ne_peut_accueillir"),
    (SubmissionField::SignatureLocation, "fait_a"),
    (SubmissionField::SubmittedOn, "fait_le"),
];

impl SubmissionField {
    /// Whether the template field is a checkbox rather than text.
    pub fn is_checkbox(self) -> bool {
        matches!(self, Self::WantsMeeting | Self::CannotAccept)
    }

    /// Extract this attribute from a submission.
    pub fn value(self, s: &Submission) -> FieldValue {
        let text = |v: &Option<String>| FieldValue::Text(v.clone().unwrap_or_default());
        match self {
            Self::CompanyName => FieldValue::Text(s.company_name.clone()),
            Self::CompanyAddress => FieldValue::Text(s.company_address.clone()),
            Self::CompanyPostalCode => text(&s.company_postal_code),
            Self::CompanyCity => text(&s.company_city),
            Self::ContactName => FieldValue::Text(s.contact_name.clone()),
            Self::ContactPosition => FieldValue::Text(s.contact_position.clone()),
            Self::ContactEmail => FieldValue::Text(s.contact_email.clone()),
            Self::ContactPhone => FieldValue::Text(s.contact_phone.clone()),
            Self::ContactFax => text(&s.contact_fax),
            Self::DirectPhone => text(&s.direct_phone),
            Self::DirectFax => text(&s.direct_fax),
            Self::DirectEmail => text(&s.direct_email),
            Self::StudentFirstName => text(&s.student_first_name),
            Self::StudentLastName => text(&s.student_last_name),
            Self::PositionsCount => FieldValue::Text(
                s.positions_count.map(|n| n.to_string()).unwrap_or_default(),
            ),
            Self::InternshipTitle => text(&s.internship_title),
            Self::InternshipDescription => text(&s.internship_description),
            Self::InternshipRequirements => text(&s.internship_requirements),
            Self::InternshipStartDate => FieldValue::Text(
                s.internship_start_date
                    .map(|d| d.format(PRINT_DATE_FORMAT).to_string())
                    .unwrap_or_default(),
            ),
            Self::InternshipDuration => text(&s.internship_duration),
            Self::Topic1 => text(&s.topic_1),
            Self::Topic2 => text(&s.topic_2),
            Self::Topic3 => text(&s.topic_3),
            Self::WantsMeeting => FieldValue::Check(s.wants_meeting),
            Self::CannotAccept => FieldValue::Check(s.cannot_accept),
            Self::SignatureLocation => text(&s.signature_location),
            Self::SubmittedOn => {
                FieldValue::Text(s.created_at.format(PRINT_DATE_FORMAT).to_string())
            }
        }
    }
}

/// Every template field name paired with its value for `submission`.
pub fn field_values(submission: &Submission) -> Vec<(&'static str, FieldValue)> {
    FIELD_MAP
        .iter()
        .map(|(attr, name)| (*name, attr.value(submission)))
        .collect()
}

/// Deterministic output file name: `internship_<id>_<company-slug>.pdf`.
///
/// The id keeps names unique per submission; the slug is for humans.
pub fn output_file_name(submission: &Submission) -> String {
    let slug = slugify(&submission.company_name);
    if slug.is_empty() {
        format!("internship_{}.pdf", submission.id)
    } else {
        format!("internship_{}_{slug}.pdf", submission.id)
    }
}

/// Lower-case ASCII snake slug; non-ASCII letters are transliterated and
/// everything that is not alphanumeric collapses into single underscores.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());

    let mut pending_separator = false;
    let mut add_char = |c: char| {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    };

    for c in input.chars() {
        if c.is_ascii() {
            add_char(c);
        } else if let Some(translit) = deunicode_char(c) {
            translit.chars().for_each(&mut add_char);
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('_') {
            slug.pop();
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::test_support::sample_submission;

    #[test]
    fn table_has_unique_attributes_and_names() {
        let names: HashSet<_> = FIELD_MAP.iter().map(|(_, n)| *n).collect();
        let attrs: Vec<_> = FIELD_MAP.iter().map(|(a, _)| *a).collect();
        assert_eq!(names.len(), FIELD_MAP.len());
        for (i, a) in attrs.iter().enumerate() {
            assert!(!attrs[i + 1..].contains(a), "{a:?} mapped twice");
        }
    }

    #[test]
    fn values_follow_the_submission() {
        let s = sample_submission(7, "Test Company");
        let values = field_values(&s);
        let get = |name: &str| values.iter().find(|(n, _)| *n == name).unwrap().1.clone();

        assert_eq!(get("raison_sociale"), FieldValue::Text("Test Company".into()));
        assert_eq!(get("email"), FieldValue::Text("john.doe@testcompany.com".into()));
        assert_eq!(get("fax"), FieldValue::Text(String::new()));
        assert_eq!(get("nombre_stagiaires"), FieldValue::Text("2".into()));
        assert_eq!(get("date_debut"), FieldValue::Text("01/06/2023".into()));
        assert_eq!(get("souhaite_rencontre"), FieldValue::Check(true));
        assert_eq!(get("ne_peut_accueillir"), FieldValue::Check(false));
    }

    #[test]
    fn checkbox_attributes_yield_check_values() {
        let s = sample_submission(1, "X Co");
        for (attr, _) in FIELD_MAP {
            let is_check = matches!(attr.value(&s), FieldValue::Check(_));
            assert_eq!(is_check, attr.is_checkbox(), "{attr:?}");
        }
    }

    #[test]
    fn file_name_contains_id_and_slug() {
        let s = sample_submission(42, "Test Company");
        assert_eq!(output_file_name(&s), "internship_42_test_company.pdf");
    }

    #[test]
    fn file_name_without_usable_characters_uses_id_only() {
        let s = sample_submission(3, "***");
        assert_eq!(output_file_name(&s), "internship_3.pdf");
    }

    #[test]
    fn slug_strips_path_characters() {
        assert_eq!(slugify("../../etc/passwd"), "etc_passwd");
        assert_eq!(slugify("A/B\\C:D"), "a_b_c_d");
    }

    #[test]
    fn slug_transliterates() {
        assert_eq!(slugify("Société Générale"), "societe_generale");
    }

    #[test]
    fn slug_is_bounded() {
        let slug = slugify(&"ab ".repeat(100));
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('_'));
    }
}
