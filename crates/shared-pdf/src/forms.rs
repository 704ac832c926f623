//! Interactive form (AcroForm) field listing

use std::collections::HashSet;

use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::Serialize;

use crate::text::decode_text_string;

/// Name used for fields that carry no `/T` entry
pub const UNNAMED_FIELD: &str = "UnnamedField";

/// Backstop for deeply nested field trees built from direct dictionaries
const MAX_FIELD_DEPTH: usize = 32;

/// A terminal form field with its current value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    /// Fully qualified name (`parent.child`), or [`UNNAMED_FIELD`]
    pub name: String,
    /// Current value, empty when unset
    pub value: String,
}

/// List the terminal fields of the document's AcroForm in declaration order.
///
/// Documents without an AcroForm, or with a malformed one, yield no fields.
pub fn form_fields(doc: &Document) -> Vec<FormField> {
    let Some(acroform) = acroform(doc) else {
        return Vec::new();
    };

    let Some(Object::Array(roots)) = acroform.get(b"Fields").ok().map(|o| resolve(doc, o)) else {
        return Vec::new();
    };

    let mut walk = FieldWalk {
        doc,
        visited: HashSet::new(),
        fields: Vec::new(),
    };
    for root in roots {
        walk.visit(root, None, 0);
    }
    walk.fields
}

fn acroform(doc: &Document) -> Option<&Dictionary> {
    let root_id = doc.trailer.get(b"Root").ok()?.as_reference().ok()?;
    let catalog = doc.get_dictionary(root_id).ok()?;
    as_dict(doc, catalog.get(b"AcroForm").ok()?)
}

/// Depth-first walk over the field tree.
///
/// Each indirect field object is visited at most once, so `/Kids` arrays that
/// point back at an ancestor (or repeat an entry) cannot blow up the walk.
struct FieldWalk<'a> {
    doc: &'a Document,
    visited: HashSet<ObjectId>,
    fields: Vec<FormField>,
}

impl<'a> FieldWalk<'a> {
    fn visit(&mut self, obj: &'a Object, parent_name: Option<&str>, depth: usize) {
        if depth > MAX_FIELD_DEPTH {
            return;
        }
        if let Object::Reference(id) = obj {
            if !self.visited.insert(*id) {
                return;
            }
        }
        let Some(field) = as_dict(self.doc, obj) else {
            return;
        };

        let partial = field
            .get(b"T")
            .ok()
            .and_then(|o| string_value(self.doc, o))
            .filter(|s| !s.is_empty());

        let qualified = match (parent_name, partial.as_deref()) {
            (Some(parent), Some(name)) => Some(format!("{}.{}", parent, name)),
            (None, Some(name)) => Some(name.to_string()),
            (Some(parent), None) => Some(parent.to_string()),
            (None, None) => None,
        };

        // Kids without a /T are widget annotations of this field, not child fields
        let kids = field.get(b"Kids").ok().map(|o| resolve(self.doc, o));
        let named_kids: Vec<&'a Object> = match kids {
            Some(Object::Array(kids)) => kids
                .iter()
                .filter(|kid| as_dict(self.doc, kid).is_some_and(|dict| dict.get(b"T").is_ok()))
                .collect(),
            _ => Vec::new(),
        };

        if named_kids.is_empty() {
            let value = field
                .get(b"V")
                .ok()
                .and_then(|o| string_value(self.doc, o))
                .unwrap_or_default();
            self.fields.push(FormField {
                name: qualified.unwrap_or_else(|| UNNAMED_FIELD.to_string()),
                value,
            });
            return;
        }

        for kid in named_kids {
            self.visit(kid, qualified.as_deref(), depth + 1);
        }
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

fn as_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, obj) {
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Render a field value. Text strings are decoded, names (checkbox states)
/// are taken verbatim, arrays (multi-select lists) are comma-joined.
fn string_value(doc: &Document, obj: &Object) -> Option<String> {
    match resolve(doc, obj) {
        Object::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| scalar_value(doc, item))
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => scalar_value(doc, other),
    }
}

fn scalar_value(doc: &Document, obj: &Object) -> Option<String> {
    match resolve(doc, obj) {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        Object::Integer(i) => Some(i.to_string()),
        Object::Real(r) => Some(r.to_string()),
        Object::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}
