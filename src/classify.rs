use crate::model::CertificateType;

const PDF_EXTENSION: &str = ".pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Not a pdf, ignored entirely.
    Skipped,
    /// A pdf no configured label matches.
    Unrecognized,
    /// Index into the configured certificate list.
    Certificate(usize),
}

pub fn is_pdf(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(PDF_EXTENSION)
}

/// Maps a file name onto the earliest configured certificate whose label it
/// contains, ignoring case.
pub fn classify(file_name: &str, certificates: &[CertificateType]) -> Classification {
    if !is_pdf(file_name) {
        return Classification::Skipped;
    }
    let name = file_name.to_uppercase();
    certificates
        .iter()
        .position(|certificate| name.contains(&certificate.key()))
        .map(Classification::Certificate)
        .unwrap_or(Classification::Unrecognized)
}
