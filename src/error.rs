use std::{io, path::PathBuf};

use thiserror::Error;

/// Problems with the audit settings; a batch refuses to start on any of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no expected certificate types configured")]
    NoCertificates,
    #[error("certificate label at position {0} is blank")]
    BlankCertificate(usize),
    #[error("target phrase must not be empty in positive debt mode")]
    EmptyTargetLine,
    #[error("unable to read configuration file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("configuration file {} is not valid", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to encode configuration")]
    Encode(#[source] serde_json::Error),
    #[error("unable to write configuration file {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Batch-level failures. No report is produced when one of these is returned.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("root folder {} does not exist", .0.display())]
    RootNotFound(PathBuf),
    #[error("root path {} is not a directory", .0.display())]
    RootNotDirectory(PathBuf),
    #[error("unable to list root folder {}", .path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("batch worker stopped unexpectedly")]
    Worker,
}

impl AuditError {
    pub fn is_config(&self) -> bool {
        matches!(self, AuditError::Config(_))
    }
}

/// File-level failures of the phrase probe. Absorbed by the folder verifier.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("unable to open {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to parse {} as pdf", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },
    #[error("unable to extract text from page {page} of {}", .path.display())]
    Page {
        path: PathBuf,
        page: usize,
        #[source]
        source: anyhow::Error,
    },
    #[error("pdf parser panicked on {}", .path.display())]
    Panicked { path: PathBuf },
}
