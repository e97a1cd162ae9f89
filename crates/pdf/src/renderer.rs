//! File-level rendering: template on disk in, filled document on disk out.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use intake_db::models::submission::Submission;
use lopdf::Document;
use tempfile::NamedTempFile;

use crate::filler::{fill_fields, read_fields};
use crate::mapping::{field_values, output_file_name};
use crate::PdfError;

/// Fills the configured template for one submission at a time.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    template_path: PathBuf,
    output_dir: PathBuf,
}

impl PdfRenderer {
    pub fn new(template_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Where the document for `submission` is written.
    pub fn output_path(&self, submission: &Submission) -> PathBuf {
        self.output_dir.join(output_file_name(submission))
    }

    /// Fill the template with `submission` and write it to [`Self::output_path`].
    ///
    /// The document is written to a temporary file in the output directory and
    /// renamed into place, so a failure never leaves a partial file behind and
    /// a previous render of the same submission is replaced atomically.
    pub fn render(&self, submission: &Submission) -> Result<PathBuf, PdfError> {
        if !self.template_path.is_file() {
            return Err(PdfError::TemplateMissing(self.template_path.clone()));
        }

        let mut doc = Document::load(&self.template_path)?;
        let filled = fill_fields(&mut doc, &field_values(submission))?;

        fs::create_dir_all(&self.output_dir)?;
        let target = self.output_path(submission);

        let mut tmp = NamedTempFile::new_in(&self.output_dir)?;
        doc.save_to(tmp.as_file_mut())?;
        tmp.persist(&target).map_err(|e| PdfError::Io(e.error))?;

        tracing::info!(
            submission_id = submission.id,
            fields = filled,
            path = %target.display(),
            "Submission PDF rendered",
        );
        Ok(target)
    }

    /// Render and return the document bytes together with its file name.
    pub fn render_to_bytes(&self, submission: &Submission) -> Result<(String, Vec<u8>), PdfError> {
        let path = self.render(submission)?;
        let bytes = fs::read(&path)?;
        Ok((output_file_name(submission), bytes))
    }
}

/// Read the field values of a filled document on disk.
pub fn read_field_values(path: &Path) -> Result<BTreeMap<String, String>, PdfError> {
    let doc = Document::load(path)?;
    read_fields(&doc)
}

/// Write a blank template to `path`, creating parent directories.
pub fn write_blank_template(path: &Path) -> Result<(), PdfError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut doc = crate::template::blank_template();
    doc.save(path)?;
    Ok(())
}

/// Write the blank template to `path` unless a file is already there.
///
/// Returns `true` when a template was written.
pub fn ensure_template(path: &Path) -> Result<bool, PdfError> {
    if path.is_file() {
        return Ok(false);
    }
    write_blank_template(path)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::test_support::sample_submission;

    fn renderer_in(dir: &Path) -> PdfRenderer {
        let template = dir.join("template.pdf");
        write_blank_template(&template).unwrap();
        PdfRenderer::new(template, dir.join("out"))
    }

    #[test]
    fn render_writes_filled_document() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer_in(dir.path());
        let submission = sample_submission(5, "Test Company");

        let path = renderer.render(&submission).unwrap();
        assert_eq!(path, dir.path().join("out/internship_5_test_company.pdf"));

        let fields = read_field_values(&path).unwrap();
        assert_eq!(fields["raison_sociale"], "Test Company");
        assert_eq!(fields["intitule_stage"], "Software Developer Intern");
        assert_eq!(fields["fait_le"], "15/03/2024");
        assert_eq!(fields["souhaite_rencontre"], "Yes");
        assert_eq!(fields["fax"], "");
    }

    #[test]
    fn rendering_twice_yields_identical_field_content() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer_in(dir.path());
        let submission = sample_submission(9, "Same Co");

        let first = read_field_values(&renderer.render(&submission).unwrap()).unwrap();
        let second = read_field_values(&renderer.render(&submission).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn non_ascii_values_survive() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer_in(dir.path());
        let submission = sample_submission(2, "Société Générale");

        let path = renderer.render(&submission).unwrap();
        assert!(path.ends_with("internship_2_societe_generale.pdf"));
        assert_eq!(read_field_values(&path).unwrap()["raison_sociale"], "Société Générale");
    }

    #[test]
    fn missing_template_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PdfRenderer::new(dir.path().join("absent.pdf"), dir.path().join("out"));

        assert_matches!(
            renderer.render(&sample_submission(1, "X Co")),
            Err(PdfError::TemplateMissing(_))
        );
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn corrupt_template_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("broken.pdf");
        fs::write(&template, b"this is not a pdf").unwrap();
        let renderer = PdfRenderer::new(template, dir.path().join("out"));

        assert!(renderer.render(&sample_submission(1, "X Co")).is_err());
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn render_to_bytes_returns_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = renderer_in(dir.path());
        let (name, bytes) = renderer.render_to_bytes(&sample_submission(4, "Bytes Co")).unwrap();
        assert_eq!(name, "internship_4_bytes_co.pdf");
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn ensure_template_writes_a_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("static/pdf/template.pdf");

        assert!(ensure_template(&template).unwrap());
        let renderer = PdfRenderer::new(template, dir.path().join("out"));
        let path = renderer.render(&sample_submission(8, "Boot Co")).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn ensure_template_keeps_an_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.pdf");
        std::fs::write(&template, b"custom template").unwrap();

        assert!(!ensure_template(&template).unwrap());
        assert_eq!(std::fs::read(&template).unwrap(), b"custom template");
    }
}
