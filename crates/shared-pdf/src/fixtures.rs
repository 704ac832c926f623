//! In-memory PDF builders for tests
//!
//! Every page gets a Helvetica (WinAnsi) font resource so both pdf-extract
//! and lopdf can decode the text operators.

use lopdf::content::{Content, Operation};
use lopdf::encryption::{decrypt_object, get_encryption_key};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// A top-level form field for [`form_pdf`]
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec<'a> {
    pub name: Option<&'a str>,
    pub value: Option<&'a str>,
}

impl<'a> FieldSpec<'a> {
    pub fn new(name: Option<&'a str>, value: Option<&'a str>) -> Self {
        Self { name, value }
    }
}

/// A PDF with one page per entry, each line of the entry drawn as a text line
pub fn text_pdf(pages: &[&str]) -> Vec<u8> {
    let (mut doc, catalog_id) = build_document(pages);
    save(&mut doc, catalog_id)
}

/// A PDF whose pages have empty content streams
pub fn blank_pdf(num_pages: usize) -> Vec<u8> {
    let pages = vec![""; num_pages];
    text_pdf(&pages)
}

/// A PDF with body text and an AcroForm listing the given fields
pub fn form_pdf(pages: &[&str], fields: &[FieldSpec<'_>]) -> Vec<u8> {
    let (mut doc, catalog_id) = build_document(pages);

    let field_refs: Vec<Object> = fields
        .iter()
        .map(|spec| {
            let mut field = Dictionary::new();
            field.set("FT", Object::Name(b"Tx".to_vec()));
            if let Some(name) = spec.name {
                field.set("T", literal(name));
            }
            if let Some(value) = spec.value {
                field.set("V", literal(value));
            }
            Object::Reference(doc.add_object(field))
        })
        .collect();

    attach_acroform(&mut doc, catalog_id, field_refs);
    save(&mut doc, catalog_id)
}

/// A PDF with one parent field holding named children
pub fn nested_form_pdf(parent: &str, children: &[(&str, &str)]) -> Vec<u8> {
    let (mut doc, catalog_id) = build_document(&["Form"]);
    let parent_id = doc.new_object_id();

    let kids: Vec<Object> = children
        .iter()
        .map(|(name, value)| {
            let kid = Dictionary::from_iter(vec![
                ("FT", Object::Name(b"Tx".to_vec())),
                ("T", literal(name)),
                ("V", literal(value)),
                ("Parent", Object::Reference(parent_id)),
            ]);
            Object::Reference(doc.add_object(kid))
        })
        .collect();

    let parent_dict = Dictionary::from_iter(vec![
        ("T", literal(parent)),
        ("Kids", Object::Array(kids)),
    ]);
    doc.objects.insert(parent_id, Object::Dictionary(parent_dict));

    attach_acroform(&mut doc, catalog_id, vec![Object::Reference(parent_id)]);
    save(&mut doc, catalog_id)
}

/// A PDF encrypted with 40-bit RC4 (revision 2) under the empty user password
pub fn encrypted_pdf(pages: &[&str]) -> Vec<u8> {
    let (mut doc, catalog_id) = build_document(pages);
    let encrypt_id = add_encryption(&mut doc, None);
    let key = get_encryption_key(&doc, "", false).expect("fixture key derives");

    // RC4 is symmetric, so the decryption routine also encrypts
    let ids: Vec<ObjectId> = doc
        .objects
        .keys()
        .copied()
        .filter(|id| *id != encrypt_id)
        .collect();
    for id in ids {
        let Some(cipher) = doc
            .objects
            .get(&id)
            .and_then(|obj| decrypt_object(&key, id, obj).ok())
        else {
            continue;
        };
        match doc.objects.get_mut(&id) {
            Some(Object::Stream(stream)) => stream.set_content(cipher),
            Some(Object::String(bytes, _)) => *bytes = cipher,
            _ => {}
        }
    }

    save(&mut doc, catalog_id)
}

/// An encrypted PDF whose user password is not empty
pub fn password_pdf(pages: &[&str]) -> Vec<u8> {
    let (mut doc, catalog_id) = build_document(pages);
    add_encryption(&mut doc, Some(vec![0u8; 32]));
    save(&mut doc, catalog_id)
}

/// A PDF whose only form field lists itself twice under `/Kids`
pub fn cyclic_form_pdf(name: &str) -> Vec<u8> {
    let (mut doc, catalog_id) = build_document(&["Form"]);
    let field_id = doc.new_object_id();

    let field = Dictionary::from_iter(vec![
        ("FT", Object::Name(b"Tx".to_vec())),
        ("T", literal(name)),
        (
            "Kids",
            Object::Array(vec![
                Object::Reference(field_id),
                Object::Reference(field_id),
            ]),
        ),
    ]);
    doc.objects.insert(field_id, Object::Dictionary(field));

    attach_acroform(&mut doc, catalog_id, vec![Object::Reference(field_id)]);
    save(&mut doc, catalog_id)
}

fn literal(text: &str) -> Object {
    Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
}

fn build_document(pages: &[&str]) -> (Document, ObjectId) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ]));
    let resources_id = doc.add_object(Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![("F1", Object::Reference(font_id))])),
    )]));

    let mut page_ids = Vec::new();
    for page_text in pages {
        let mut operations = Vec::new();
        if !page_text.is_empty() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![Object::Name(b"F1".to_vec()), Object::Integer(12)],
            ));
            operations.push(Operation::new("TL", vec![Object::Integer(14)]));
            operations.push(Operation::new(
                "Td",
                vec![Object::Integer(72), Object::Integer(720)],
            ));
            for line in page_text.lines() {
                operations.push(Operation::new("Tj", vec![literal(line)]));
                operations.push(Operation::new("T*", vec![]));
            }
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.encode().expect("fixture content encodes"),
        ));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Reference(resources_id)),
            ("Contents", Object::Reference(content_id)),
        ]));
        page_ids.push(page_id);
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(page_ids.len() as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    (doc, catalog_id)
}

/// Standard security handler entries. Without `/U` any password derives a key.
fn add_encryption(doc: &mut Document, user_hash: Option<Vec<u8>>) -> ObjectId {
    let mut dict = Dictionary::from_iter(vec![
        ("Filter", Object::Name(b"Standard".to_vec())),
        ("V", Object::Integer(1)),
        ("R", Object::Integer(2)),
        ("O", Object::String(vec![0x4F; 32], StringFormat::Hexadecimal)),
        ("P", Object::Integer(-4)),
    ]);
    if let Some(hash) = user_hash {
        dict.set("U", Object::String(hash, StringFormat::Hexadecimal));
    }
    let encrypt_id = doc.add_object(dict);

    let file_id = Object::String(b"clausematrix-fix".to_vec(), StringFormat::Hexadecimal);
    doc.trailer.set("Encrypt", Object::Reference(encrypt_id));
    doc.trailer.set("ID", Object::Array(vec![file_id.clone(), file_id]));
    encrypt_id
}

fn attach_acroform(doc: &mut Document, catalog_id: ObjectId, fields: Vec<Object>) {
    let acroform_id =
        doc.add_object(Dictionary::from_iter(vec![("Fields", Object::Array(fields))]));
    if let Ok(Object::Dictionary(catalog)) = doc.get_object_mut(catalog_id) {
        catalog.set("AcroForm", Object::Reference(acroform_id));
    }
}

fn save(doc: &mut Document, catalog_id: ObjectId) -> Vec<u8> {
    doc.trailer.set("Root", Object::Reference(catalog_id));
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("fixture PDF saves");
    buffer
}
