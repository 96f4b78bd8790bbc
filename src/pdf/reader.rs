use std::{collections::HashMap, io::Read, path::Path};

use anyhow::anyhow;
use flate2::read::ZlibDecoder;
use lopdf::{content::Content, Dictionary, Document, Object, ObjectId, Stream};

pub mod mapper;

use mapper::{build_unicode_map, UnicodeMap};

const RESOURCES: &[u8] = "Resources".as_bytes();
const FONT: &[u8] = "Font".as_bytes();
const TO_UNICODE: &[u8] = "ToUnicode".as_bytes();
const PARENT: &[u8] = "Parent".as_bytes();
const FILTER: &[u8] = "Filter".as_bytes();
const FLATE_DECODE: &[u8] = "FlateDecode".as_bytes();
const MAX_PARENT_DEPTH: usize = 32;
// text matrix moves smaller than this (in user space units) keep the same row
const ROW_TOLERANCE: f64 = 1.0;
// TJ adjustments below this (thousandths of an em) read as a word gap
const WORD_GAP: f64 = -250.0;

enum FontDecoder {
    Unicode(UnicodeMap),
    /// single byte WinAnsi style encoding, read as Latin-1
    Simple,
}

impl FontDecoder {
    fn decode(&self, bytes: &[u8]) -> String {
        match self {
            FontDecoder::Unicode(map) => map.decode(bytes),
            FontDecoder::Simple => bytes.iter().map(|b| *b as char).collect(),
        }
    }
}

pub struct PDFReader {
    doc: Document,
    pages: Vec<ObjectId>,
}

impl PDFReader {
    pub fn new(file: &Path) -> anyhow::Result<PDFReader> {
        let doc = Document::load(file)?;
        Ok(PDFReader::from_document(doc))
    }

    pub fn from_document(doc: Document) -> PDFReader {
        let pages = doc.get_pages().into_values().collect();
        PDFReader { doc, pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Text of the page at zero-based `index`, one line per text object or
    /// vertical move. Runs placed side by side on one row are joined by a
    /// space.
    pub fn page_text(&self, index: usize) -> anyhow::Result<String> {
        let page_id = *self
            .pages
            .get(index)
            .ok_or_else(|| anyhow!("page {} out of range", index + 1))?;
        let fonts = self.page_fonts(page_id)?;
        let content = Content::decode(&self.doc.get_page_content(page_id)?)?;

        let mut text = String::new();
        let mut font: Option<&FontDecoder> = None;
        // origin of the last text matrix set with Tm
        let mut origin: Option<(f64, f64)> = None;
        for operation in content.operations.iter() {
            let operands = &operation.operands;
            match operation.operator.as_str() {
                "Tf" => {
                    font = match operands.first() {
                        Some(Object::Name(name)) => fonts.get(name.as_slice()),
                        _ => None,
                    };
                }
                "Tj" => push_string(&mut text, font, operands.last()),
                "'" | "\"" => {
                    new_line(&mut text);
                    push_string(&mut text, font, operands.last());
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        for item in items {
                            match number(item) {
                                Some(n) if n < WORD_GAP => text.push(' '),
                                Some(_) => {}
                                None => push_string(&mut text, font, Some(item)),
                            }
                        }
                    }
                }
                "Td" | "TD" => {
                    let tx = operands.first().and_then(number).unwrap_or(0.0);
                    let ty = operands.get(1).and_then(number).unwrap_or(0.0);
                    if ty != 0.0 {
                        new_line(&mut text);
                    } else if tx > 0.0 {
                        word_gap(&mut text);
                    }
                }
                "Tm" => {
                    let x = operands.get(4).and_then(number).unwrap_or(0.0);
                    let y = operands.get(5).and_then(number).unwrap_or(0.0);
                    match origin {
                        Some((_, last_y)) if (y - last_y).abs() > ROW_TOLERANCE => {
                            new_line(&mut text)
                        }
                        Some((last_x, _)) if (x - last_x).abs() > ROW_TOLERANCE => {
                            word_gap(&mut text)
                        }
                        _ => {}
                    }
                    origin = Some((x, y));
                }
                "T*" | "ET" => new_line(&mut text),
                _ => {}
            }
        }
        Ok(text)
    }

    fn page_fonts(&self, page_id: ObjectId) -> anyhow::Result<HashMap<Vec<u8>, FontDecoder>> {
        let mut fonts = HashMap::new();
        let mut node = Some(page_id);
        let mut depth = 0;
        // resources are inheritable, the nearest definition of a font name wins
        while let Some(id) = node {
            let dict = self.doc.get_object(id)?.as_dict()?;
            if let Ok(resources) = dict.get(RESOURCES) {
                let resources = self.resolve(resources)?.as_dict()?;
                if let Ok(font) = resources.get(FONT) {
                    for (name, font) in self.resolve(font)?.as_dict()?.iter() {
                        if fonts.contains_key(name) {
                            continue;
                        }
                        let font = self.resolve(font)?.as_dict()?;
                        fonts.insert(name.to_owned(), self.font_decoder(font));
                    }
                }
            }
            depth += 1;
            node = match dict.get(PARENT) {
                Ok(Object::Reference(parent)) if depth < MAX_PARENT_DEPTH => Some(*parent),
                _ => None,
            };
        }
        Ok(fonts)
    }

    fn font_decoder(&self, font: &Dictionary) -> FontDecoder {
        let cmap = font
            .get(TO_UNICODE)
            .and_then(|unicode| self.resolve(unicode))
            .and_then(Object::as_stream);
        match cmap {
            Ok(stream) => stream_content(stream)
                .ok()
                .and_then(|content| build_unicode_map(&content))
                .map(FontDecoder::Unicode)
                .unwrap_or(FontDecoder::Simple),
            Err(_) => FontDecoder::Simple,
        }
    }

    fn resolve<'a>(&'a self, object: &'a Object) -> lopdf::Result<&'a Object> {
        match object {
            Object::Reference(id) => self.doc.get_object(*id),
            other => Ok(other),
        }
    }
}

fn push_string(text: &mut String, font: Option<&FontDecoder>, operand: Option<&Object>) {
    if let Some(Object::String(bytes, _)) = operand {
        match font {
            Some(font) => text.push_str(&font.decode(bytes)),
            None => text.push_str(&FontDecoder::Simple.decode(bytes)),
        }
    }
}

fn new_line(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

fn word_gap(text: &mut String) {
    if !text.is_empty() && !text.ends_with(char::is_whitespace) {
        text.push(' ');
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(n) => Some(*n as f64),
        Object::Real(n) => Some(*n as f64),
        _ => None,
    }
}

fn is_flate(stream: &Stream) -> bool {
    match stream.dict.get(FILTER) {
        Ok(Object::Name(name)) => name.as_slice() == FLATE_DECODE,
        Ok(Object::Array(filters)) => filters
            .iter()
            .any(|f| matches!(f, Object::Name(name) if name.as_slice() == FLATE_DECODE)),
        _ => false,
    }
}

fn stream_content(stream: &Stream) -> anyhow::Result<Vec<u8>> {
    if is_flate(stream) {
        decode(&stream.content)
    } else {
        Ok(stream.content.clone())
    }
}

fn decode(data: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut buf = vec![];
    let mut e = ZlibDecoder::new(data);
    e.read_to_end(&mut buf)?;
    Ok(buf)
}
