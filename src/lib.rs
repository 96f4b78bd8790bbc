// 1. list the company folders under the root
// 2. classify each folder's pdf files into the expected certificate types
// 3. look for the adverse phrase inside the pdfs, or read the due date from the file names
// 4. collect one result per company and lay them out as a report table

use std::path::Path;

pub mod batch;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod error;
pub mod expiry;
pub mod journal;
pub mod model;
pub mod pdf;
pub mod probe;
pub mod render;
pub mod report;
pub mod telemetry;
pub mod verify;

pub use batch::{
    run_batch, spawn_batch, BatchEvent, BatchHandle, BatchOutcome, BatchRequest, BatchStatus,
    CancelToken, Progress,
};
pub use config::AuditConfig;
pub use error::{AuditError, ConfigError, ProbeError};
pub use model::{
    CertificateStatus, CertificateType, CompanyResult, OverallStatus, ReportModel,
    VerificationMode,
};
pub use report::{build_report, build_report_with, Highlight, ReportLayout, ReportTable};

/// Audits `root` synchronously on the calling thread, without progress
/// reporting.
pub fn audit(root: &Path, config: &AuditConfig) -> Result<BatchOutcome, AuditError> {
    let request = BatchRequest::new(root, config);
    run_batch(
        &request,
        &catalog::FsCatalog,
        &probe::PdfProbe,
        &CancelToken::new(),
        &batch::Silent,
    )
}
