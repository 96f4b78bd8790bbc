use std::{fs::File, panic, path::Path};

use lopdf::Document;

use crate::{error::ProbeError, pdf::reader::PDFReader};

/// Looks for a literal phrase in a document's text.
pub trait PhraseProbe: Send + Sync {
    fn contains_phrase(&self, pdf_path: &Path, phrase: &str) -> Result<bool, ProbeError>;
}

/// Probe backed by the pdf text reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfProbe;

impl PhraseProbe for PdfProbe {
    fn contains_phrase(&self, pdf_path: &Path, phrase: &str) -> Result<bool, ProbeError> {
        // malformed documents can panic inside the parser
        panic::catch_unwind(|| probe(pdf_path, phrase)).unwrap_or_else(|_| {
            Err(ProbeError::Panicked {
                path: pdf_path.into(),
            })
        })
    }
}

/// Scans pages in order and stops at the first one containing `phrase`.
/// The file handle and document are released before returning.
pub fn probe(pdf_path: &Path, phrase: &str) -> Result<bool, ProbeError> {
    let file = File::open(pdf_path).map_err(|source| ProbeError::Open {
        path: pdf_path.into(),
        source,
    })?;
    let doc = Document::load_from(file).map_err(|source| ProbeError::Parse {
        path: pdf_path.into(),
        source,
    })?;
    let reader = PDFReader::from_document(doc);
    for page in 0..reader.page_count() {
        let text = reader.page_text(page).map_err(|source| ProbeError::Page {
            path: pdf_path.into(),
            page: page + 1,
            source,
        })?;
        if text.contains(phrase) {
            return Ok(true);
        }
    }
    Ok(false)
}
