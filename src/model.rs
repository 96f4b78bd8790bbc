use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// An expected certificate kind, identified by its label (e.g. `CND RFB`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateType(String);

impl CertificateType {
    pub fn new(label: &str) -> CertificateType {
        CertificateType(label.trim().into())
    }
    pub fn label(&self) -> &str {
        &self.0
    }
    /// Upper-cased label, the form file names are matched against.
    pub fn key(&self) -> String {
        self.0.to_uppercase()
    }
}

impl fmt::Display for CertificateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CertificateType {
    fn from(value: &str) -> Self {
        CertificateType::new(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationMode {
    #[default]
    #[serde(rename = "positive-debt", alias = "Verificar Positiva")]
    PositiveDebtCheck,
    #[serde(rename = "expiry", alias = "Verificar Vencimento")]
    ExpiryCheck,
}

impl VerificationMode {
    pub fn label(&self) -> &'static str {
        match self {
            VerificationMode::PositiveDebtCheck => "positive debt",
            VerificationMode::ExpiryCheck => "expiry",
        }
    }
}

impl fmt::Display for VerificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per certificate outcome. `Present`/`Absent` are produced in positive-debt
/// mode, the remaining values (plus `Absent`) in expiry mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateStatus {
    Present,
    Absent,
    Valid,
    Expired,
    DateNotFound,
    DateParseError,
}

impl CertificateStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CertificateStatus::Present => "PRESENT",
            CertificateStatus::Absent => "ABSENT",
            CertificateStatus::Valid => "VALID",
            CertificateStatus::Expired => "EXPIRED",
            CertificateStatus::DateNotFound => "DATE NOT FOUND",
            CertificateStatus::DateParseError => "DATE ERROR",
        }
    }
    pub fn is_absent(&self) -> bool {
        matches!(self, CertificateStatus::Absent)
    }
    /// Statuses a company row can carry in the given mode, in display order.
    pub fn for_mode(mode: VerificationMode) -> &'static [CertificateStatus] {
        match mode {
            VerificationMode::PositiveDebtCheck => {
                &[CertificateStatus::Present, CertificateStatus::Absent]
            }
            VerificationMode::ExpiryCheck => &[
                CertificateStatus::Valid,
                CertificateStatus::Expired,
                CertificateStatus::DateNotFound,
                CertificateStatus::DateParseError,
                CertificateStatus::Absent,
            ],
        }
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Complete,
    Incomplete,
    ProcessingError,
}

impl OverallStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OverallStatus::Complete => "COMPLETE",
            OverallStatus::Incomplete => "INCOMPLETE",
            OverallStatus::ProcessingError => "ERROR",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificatePresence {
    pub certificate: CertificateType,
    pub status: CertificateStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Verdict {
    Checked {
        presence: Vec<CertificatePresence>,
        adverse_finding: Option<CertificateType>,
        missing_types: Vec<CertificateType>,
    },
    ProcessingError {
        reason: String,
    },
}

/// Outcome of verifying one company folder. Built once, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyResult {
    company_name: String,
    verdict: Verdict,
}

impl CompanyResult {
    /// `missing_types` is derived from `presence`, so the two can't disagree.
    pub fn checked(
        company_name: &str,
        presence: Vec<CertificatePresence>,
        adverse_finding: Option<CertificateType>,
    ) -> CompanyResult {
        let missing_types = presence
            .iter()
            .filter(|p| p.status.is_absent())
            .map(|p| p.certificate.clone())
            .collect();
        CompanyResult {
            company_name: company_name.into(),
            verdict: Verdict::Checked {
                presence,
                adverse_finding,
                missing_types,
            },
        }
    }

    pub fn processing_error(company_name: &str, reason: &str) -> CompanyResult {
        CompanyResult {
            company_name: company_name.into(),
            verdict: Verdict::ProcessingError {
                reason: reason.into(),
            },
        }
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }
    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }
    pub fn presence(&self) -> &[CertificatePresence] {
        match &self.verdict {
            Verdict::Checked { presence, .. } => presence,
            Verdict::ProcessingError { .. } => &[],
        }
    }
    pub fn status_of(&self, certificate: &CertificateType) -> Option<CertificateStatus> {
        self.presence()
            .iter()
            .find(|p| &p.certificate == certificate)
            .map(|p| p.status)
    }
    pub fn adverse_finding(&self) -> Option<&CertificateType> {
        match &self.verdict {
            Verdict::Checked {
                adverse_finding, ..
            } => adverse_finding.as_ref(),
            Verdict::ProcessingError { .. } => None,
        }
    }
    pub fn missing_types(&self) -> &[CertificateType] {
        match &self.verdict {
            Verdict::Checked { missing_types, .. } => missing_types,
            Verdict::ProcessingError { .. } => &[],
        }
    }
    pub fn error_reason(&self) -> Option<&str> {
        match &self.verdict {
            Verdict::ProcessingError { reason } => Some(reason),
            Verdict::Checked { .. } => None,
        }
    }
    pub fn overall_status(&self) -> OverallStatus {
        match &self.verdict {
            Verdict::ProcessingError { .. } => OverallStatus::ProcessingError,
            Verdict::Checked { missing_types, .. } if missing_types.is_empty() => {
                OverallStatus::Complete
            }
            Verdict::Checked { .. } => OverallStatus::Incomplete,
        }
    }
}

/// Results of one finished batch together with the settings it ran under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportModel {
    mode: VerificationMode,
    certificates: Vec<CertificateType>,
    companies: Vec<CompanyResult>,
    generated_at: NaiveDateTime,
}

impl ReportModel {
    pub fn new(
        mode: VerificationMode,
        certificates: Vec<CertificateType>,
        companies: Vec<CompanyResult>,
        generated_at: NaiveDateTime,
    ) -> ReportModel {
        ReportModel {
            mode,
            certificates,
            companies,
            generated_at,
        }
    }
    pub fn mode(&self) -> VerificationMode {
        self.mode
    }
    pub fn certificates(&self) -> &[CertificateType] {
        &self.certificates
    }
    pub fn companies(&self) -> &[CompanyResult] {
        &self.companies
    }
    pub fn generated_at(&self) -> NaiveDateTime {
        self.generated_at
    }
    pub fn len(&self) -> usize {
        self.companies.len()
    }
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}
