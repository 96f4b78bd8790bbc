//! Small generated documents for tests.
use std::{io::Write, path::Path};

use flate2::{write::ZlibEncoder, Compression};
use lopdf::{
    content::{Content, Operation},
    dictionary, Document, Object, ObjectId, Stream, StringFormat,
};

/// Literal string in the single byte encoding of the `F1` font.
pub fn latin1(text: &str) -> Object {
    Object::String(
        text.chars().map(|c| c as u32 as u8).collect(),
        StringFormat::Literal,
    )
}

/// One text object drawing `text` at the top left corner.
pub fn show(text: Object) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("Td", vec![72.into(), 720.into()]),
        Operation::new("Tj", vec![text]),
        Operation::new("ET", vec![]),
    ]
}

fn add_page(doc: &mut Document, pages_id: ObjectId, operations: Vec<Operation>) -> Object {
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    })
    .into()
}

fn finish(
    mut doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    resources_id: ObjectId,
) -> Document {
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// One page per operation list, `F1` bound to Helvetica on the page tree.
pub fn content_document(pages: Vec<Vec<Operation>>) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let kids: Vec<Object> = pages
        .into_iter()
        .map(|operations| add_page(&mut doc, pages_id, operations))
        .collect();
    finish(doc, pages_id, kids, resources_id)
}

/// One page per entry, Helvetica with the standard single byte encoding.
pub fn text_document(pages: &[&str]) -> Document {
    content_document(pages.iter().map(|text| show(latin1(text))).collect())
}

/// A single page drawn with two byte codes resolved through a deflated
/// ToUnicode CMap.
pub fn cmap_document(text: &str) -> Document {
    let mut glyphs: Vec<char> = vec![];
    for c in text.chars() {
        if !glyphs.contains(&c) {
            glyphs.push(c);
        }
    }
    let mut cmap = format!(
        "begincmap\n1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n{} beginbfchar\n",
        glyphs.len()
    );
    for (i, c) in glyphs.iter().enumerate() {
        cmap.push_str(&format!("<{:04X}> <{:04X}>\n", i + 1, *c as u32));
    }
    cmap.push_str("endbfchar\nendcmap\n");
    let mut e = ZlibEncoder::new(Vec::new(), Compression::default());
    e.write_all(cmap.as_bytes()).unwrap();
    let cmap = e.finish().unwrap();

    let codes: Vec<u8> = text
        .chars()
        .flat_map(|c| {
            let code = glyphs.iter().position(|g| *g == c).unwrap() as u16 + 1;
            code.to_be_bytes()
        })
        .collect();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let cmap_id = doc.add_object(Stream::new(
        dictionary! { "Filter" => "FlateDecode" },
        cmap,
    ));
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "Embedded",
        "Encoding" => "Identity-H",
        "ToUnicode" => cmap_id,
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let page = add_page(
        &mut doc,
        pages_id,
        show(Object::String(codes, StringFormat::Hexadecimal)),
    );
    finish(doc, pages_id, vec![page], resources_id)
}

/// Replaces the resources of the page at zero-based `index` with a value
/// that is not a dictionary, so its text can no longer be read.
pub fn break_page(doc: &mut Document, index: usize) {
    let page_id = *doc.get_pages().values().nth(index).unwrap();
    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .unwrap()
        .set("Resources", 5);
}

pub fn save(mut doc: Document, path: &Path) {
    doc.save(path).unwrap();
}
