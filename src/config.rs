use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    model::{CertificateType, VerificationMode},
};

pub const DEFAULT_TARGET_LINE: &str = "CERTIDÃO POSITIVA DE DÉBITOS - CPD";
pub const DEFAULT_CERTIFICATES: [&str; 5] = [
    "CND MUNICIPAL",
    "CND RFB",
    "CND FGTS",
    "CND PROC",
    "CND ESTADUAL",
];

/// Settings for one audit run. Handed to a batch by value; the batch never
/// sees later edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub expected_files: Vec<CertificateType>,
    pub target_line: String,
    pub mode: VerificationMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_folder: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        AuditConfig {
            expected_files: DEFAULT_CERTIFICATES
                .iter()
                .map(|label| CertificateType::new(label))
                .collect(),
            target_line: DEFAULT_TARGET_LINE.into(),
            mode: VerificationMode::default(),
            last_folder: None,
        }
    }
}

impl AuditConfig {
    /// Reads a JSON settings file. Keys absent from the file keep their
    /// defaults, and a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<AuditConfig, ConfigError> {
        if !path.exists() {
            return Ok(AuditConfig::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.into(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.into(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = serde_json::to_string_pretty(self).map_err(ConfigError::Encode)?;
        fs::write(path, raw).map_err(|source| ConfigError::Write {
            path: path.into(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.expected_files.is_empty() {
            return Err(ConfigError::NoCertificates);
        }
        if let Some(position) = self
            .expected_files
            .iter()
            .position(|c| c.label().trim().is_empty())
        {
            return Err(ConfigError::BlankCertificate(position));
        }
        if self.mode == VerificationMode::PositiveDebtCheck && self.target_line.is_empty() {
            return Err(ConfigError::EmptyTargetLine);
        }
        Ok(())
    }

    pub fn with_mode(mut self, mode: VerificationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_target_line(mut self, target_line: &str) -> Self {
        self.target_line = target_line.into();
        self
    }

    pub fn with_expected_files<S: AsRef<str>>(mut self, labels: &[S]) -> Self {
        self.expected_files = labels
            .iter()
            .map(|label| CertificateType::new(label.as_ref()))
            .collect();
        self
    }
}
