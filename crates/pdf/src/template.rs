//! Blank A4 template carrying every mapped form field.
//!
//! Deployments normally ship the scanned paper document with fields placed by
//! hand; this generated layout is the fallback written by
//! `intake-api --write-template` and the fixture used in tests.

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::mapping::FIELD_MAP;

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const TOP: i64 = 800;
const ROW_HEIGHT: i64 = 28;
const LABEL_X: i64 = 40;
const FIELD_X: i64 = 200;
const FIELD_RIGHT: i64 = 555;
const CHECKBOX_SIZE: i64 = 12;
const DEFAULT_APPEARANCE: &str = "/Helv 9 Tf 0 g";

fn int(n: i64) -> Object {
    Object::Integer(n)
}

fn rect(x1: i64, y1: i64, x2: i64, y2: i64) -> Object {
    Object::Array(vec![int(x1), int(y1), int(x2), int(y2)])
}

/// Build the template document.
pub fn blank_template() -> Document {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let page_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let font_resources = || dictionary! { "Font" => dictionary! { "Helv" => font_id } };

    let (check_on, check_off) = checkbox_appearances(&mut doc);

    let mut content = String::from("BT /Helv 14 Tf 1 0 0 1 40 815 Tm (Internship Request) Tj ET\n");
    let mut field_ids: Vec<Object> = Vec::with_capacity(FIELD_MAP.len());

    for (row, (attr, name)) in FIELD_MAP.iter().enumerate() {
        let y = TOP - ROW_HEIGHT * (row as i64 + 1);
        content.push_str(&format!(
            "BT /Helv 9 Tf 1 0 0 1 {LABEL_X} {} Tm ({name}) Tj ET\n",
            y + 3
        ));

        let field = if attr.is_checkbox() {
            dictionary! {
                "Type" => "Annot",
                "Subtype" => "Widget",
                "FT" => "Btn",
                "T" => Object::string_literal(*name),
                "V" => "Off",
                "AS" => "Off",
                "F" => int(4),
                "P" => page_id,
                "Rect" => rect(FIELD_X, y, FIELD_X + CHECKBOX_SIZE, y + CHECKBOX_SIZE),
                "AP" => dictionary! {
                    "N" => dictionary! { "Yes" => check_on, "Off" => check_off },
                },
            }
        } else {
            dictionary! {
                "Type" => "Annot",
                "Subtype" => "Widget",
                "FT" => "Tx",
                "T" => Object::string_literal(*name),
                "V" => Object::string_literal(""),
                "DA" => Object::string_literal(DEFAULT_APPEARANCE),
                "F" => int(4),
                "P" => page_id,
                "Rect" => rect(FIELD_X, y - 4, FIELD_RIGHT, y + 14),
            }
        };
        field_ids.push(doc.add_object(field).into());
    }

    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let page = dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => rect(0, 0, PAGE_WIDTH, PAGE_HEIGHT),
        "Contents" => content_id,
        "Resources" => font_resources(),
        "Annots" => Object::Array(field_ids.clone()),
    };
    doc.objects.insert(page_id, Object::Dictionary(page));

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => Object::Array(vec![page_id.into()]),
        "Count" => int(1),
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let acroform_id = doc.add_object(dictionary! {
        "Fields" => Object::Array(field_ids),
        "DR" => font_resources(),
        "DA" => Object::string_literal(DEFAULT_APPEARANCE),
    });

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "AcroForm" => acroform_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Appearance streams for the checked and unchecked states.
fn checkbox_appearances(doc: &mut Document) -> (ObjectId, ObjectId) {
    let xobject = || {
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => rect(0, 0, CHECKBOX_SIZE, CHECKBOX_SIZE),
        }
    };
    let on = doc.add_object(Stream::new(
        xobject(),
        b"0 g 0.5 w 0 0 12 12 re S 2 2 8 8 re f\n".to_vec(),
    ));
    let off = doc.add_object(Stream::new(xobject(), b"0 g 0.5 w 0 0 12 12 re S\n".to_vec()));
    (on, off)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filler::read_fields;

    #[test]
    fn template_exposes_every_mapped_field() {
        let doc = blank_template();
        let fields = read_fields(&doc).unwrap();
        for (_, name) in FIELD_MAP {
            assert!(fields.contains_key(*name), "missing {name}");
        }
        assert_eq!(fields.len(), FIELD_MAP.len());
    }

    #[test]
    fn template_survives_save_and_reload() {
        let mut doc = blank_template();
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let reloaded = Document::load_mem(&bytes).unwrap();
        assert_eq!(read_fields(&reloaded).unwrap().len(), FIELD_MAP.len());
    }
}
