//! AcroForm filling on an in-memory [`lopdf::Document`].

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

use crate::mapping::FieldValue;
use crate::PdfError;

/// Name of the "on" appearance state when a checkbox does not declare one.
const DEFAULT_ON_STATE: &[u8] = b"Yes";
const OFF_STATE: &[u8] = b"Off";

/// A terminal form field located in the document.
#[derive(Debug)]
struct FormField {
    name: String,
    id: ObjectId,
    /// Widget annotations split from the field dictionary (no `/T`).
    widgets: Vec<ObjectId>,
}

/// Write `values` into the matching form fields of `doc`.
///
/// Returns the number of fields written. Names in `values` that the template
/// does not contain are skipped with a debug log; a document without any form
/// is an error.
pub fn fill_fields(
    doc: &mut Document,
    values: &[(&'static str, FieldValue)],
) -> Result<usize, PdfError> {
    let fields = collect_fields(doc)?;
    let mut filled = 0;

    for (name, value) in values {
        let Some(field) = fields.iter().find(|f| f.name == *name) else {
            tracing::debug!(field = name, "Template has no field for mapped attribute");
            continue;
        };

        match value {
            FieldValue::Text(text) => {
                let dict = doc.get_dictionary_mut(field.id)?;
                dict.set("V", encode_text(text));
            }
            FieldValue::Check(checked) => {
                let on_state = on_state_name(doc, field)?;
                let state = if *checked { on_state } else { OFF_STATE.to_vec() };
                doc.get_dictionary_mut(field.id)?
                    .set("V", Object::Name(state.clone()));
                let targets: Vec<ObjectId> = if field.widgets.is_empty() {
                    vec![field.id]
                } else {
                    field.widgets.clone()
                };
                for widget in targets {
                    doc.get_dictionary_mut(widget)?
                        .set("AS", Object::Name(state.clone()));
                }
            }
        }
        filled += 1;
    }

    set_need_appearances(doc)?;
    Ok(filled)
}

/// Read every named field's current value as text.
///
/// Checkboxes read as their state name (`Yes` / `Off`).
pub fn read_fields(doc: &Document) -> Result<BTreeMap<String, String>, PdfError> {
    let mut out = BTreeMap::new();
    for field in collect_fields(doc)? {
        let dict = doc.get_dictionary(field.id)?;
        let value = match dict.get(b"V") {
            Ok(Object::String(bytes, _)) => decode_text(bytes),
            Ok(Object::Name(name)) => String::from_utf8_lossy(name).into_owned(),
            _ => String::new(),
        };
        out.insert(field.name, value);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Field tree
// ---------------------------------------------------------------------------

fn acroform(doc: &Document) -> Result<&Dictionary, PdfError> {
    match doc.catalog()?.get(b"AcroForm") {
        Ok(Object::Reference(id)) => Ok(doc.get_dictionary(*id)?),
        Ok(Object::Dictionary(dict)) => Ok(dict),
        _ => Err(PdfError::NoForm),
    }
}

fn collect_fields(doc: &Document) -> Result<Vec<FormField>, PdfError> {
    let roots = match acroform(doc)?.get(b"Fields") {
        Ok(Object::Array(items)) => references(items),
        _ => return Err(PdfError::NoForm),
    };

    let mut fields = Vec::new();
    for id in roots {
        walk(doc, id, None, &mut fields, 0)?;
    }
    if fields.is_empty() {
        return Err(PdfError::NoForm);
    }
    Ok(fields)
}

/// Depth limit guarding against cyclic `/Kids` references.
const MAX_FIELD_DEPTH: usize = 16;

fn walk(
    doc: &Document,
    id: ObjectId,
    parent_name: Option<&str>,
    out: &mut Vec<FormField>,
    depth: usize,
) -> Result<(), PdfError> {
    if depth > MAX_FIELD_DEPTH {
        return Ok(());
    }
    let dict = doc.get_dictionary(id)?;

    let partial = match dict.get(b"T") {
        Ok(Object::String(bytes, _)) => Some(decode_text(bytes)),
        _ => None,
    };
    let name = match (parent_name, partial) {
        (Some(parent), Some(p)) => format!("{parent}.{p}"),
        (None, Some(p)) => p,
        // A kid without a name is a widget of its parent, handled there.
        (_, None) => return Ok(()),
    };

    let kids = match dict.get(b"Kids") {
        Ok(Object::Array(items)) => references(items),
        _ => Vec::new(),
    };

    let mut widgets = Vec::new();
    let mut has_named_kids = false;
    for kid in &kids {
        let kid_dict = doc.get_dictionary(*kid)?;
        if kid_dict.has(b"T") {
            has_named_kids = true;
        } else {
            widgets.push(*kid);
        }
    }

    if has_named_kids {
        for kid in kids {
            walk(doc, kid, Some(&name), out, depth + 1)?;
        }
    } else {
        out.push(FormField { name, id, widgets });
    }
    Ok(())
}

fn references(items: &[Object]) -> Vec<ObjectId> {
    items.iter().filter_map(|o| o.as_reference().ok()).collect()
}

/// The checkbox's "on" appearance name, taken from its normal appearances.
fn on_state_name(doc: &Document, field: &FormField) -> Result<Vec<u8>, PdfError> {
    let widget = field.widgets.first().copied().unwrap_or(field.id);
    let dict = doc.get_dictionary(widget)?;

    let appearances = match dict.get(b"AP") {
        Ok(Object::Dictionary(ap)) => ap,
        Ok(Object::Reference(ap_id)) => doc.get_dictionary(*ap_id)?,
        _ => return Ok(DEFAULT_ON_STATE.to_vec()),
    };
    let normal = match appearances.get(b"N") {
        Ok(Object::Dictionary(n)) => n,
        Ok(Object::Reference(n_id)) => match doc.get_object(*n_id)? {
            Object::Dictionary(n) => n,
            _ => return Ok(DEFAULT_ON_STATE.to_vec()),
        },
        _ => return Ok(DEFAULT_ON_STATE.to_vec()),
    };

    Ok(normal
        .iter()
        .map(|(key, _)| key.clone())
        .find(|key| key.as_slice() != OFF_STATE)
        .unwrap_or_else(|| DEFAULT_ON_STATE.to_vec()))
}

/// Ask viewers to regenerate field appearances from the new values.
fn set_need_appearances(doc: &mut Document) -> Result<(), PdfError> {
    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    let acroform_ref = match doc.get_dictionary(root_id)?.get(b"AcroForm") {
        Ok(Object::Reference(id)) => Some(*id),
        Ok(Object::Dictionary(_)) => None,
        _ => return Err(PdfError::NoForm),
    };

    let form = match acroform_ref {
        Some(id) => doc.get_dictionary_mut(id)?,
        None => doc
            .get_dictionary_mut(root_id)?
            .get_mut(b"AcroForm")?
            .as_dict_mut()?,
    };
    form.set("NeedAppearances", Object::Boolean(true));
    Ok(())
}

// ---------------------------------------------------------------------------
// Text strings
// ---------------------------------------------------------------------------

/// PDF text string: plain literal for ASCII, UTF-16BE with BOM otherwise.
fn encode_text(text: &str) -> Object {
    if text.is_ascii() {
        Object::string_literal(text)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

fn decode_text(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        // PDFDocEncoding matches Latin-1 on the printable range.
        _ => bytes.iter().map(|&b| b as char).collect(),
    }
}
