use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::{
    catalog::{Catalog, CompanyFolder},
    classify::{classify, Classification},
    config::AuditConfig,
    expiry,
    model::{
        CertificatePresence, CertificateStatus, CertificateType, CompanyResult, VerificationMode,
    },
    probe::PhraseProbe,
};

/// Side-channel findings for the audit journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEvent {
    AdverseFinding {
        company: String,
        certificate: CertificateType,
        file: PathBuf,
    },
    MissingCertificates {
        company: String,
        folder: PathBuf,
        missing: Vec<CertificateType>,
    },
    UnreadableDocument {
        company: String,
        file: PathBuf,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Verification {
    pub result: CompanyResult,
    pub events: Vec<AuditEvent>,
}

/// Verifies a single company folder. Never fails: listing errors become a
/// `ProcessingError` result and unreadable documents count as not positive.
pub struct FolderVerifier<'a> {
    config: &'a AuditConfig,
    today: NaiveDate,
    catalog: &'a dyn Catalog,
    probe: &'a dyn PhraseProbe,
}

impl<'a> FolderVerifier<'a> {
    pub fn new(
        config: &'a AuditConfig,
        today: NaiveDate,
        catalog: &'a dyn Catalog,
        probe: &'a dyn PhraseProbe,
    ) -> FolderVerifier<'a> {
        FolderVerifier {
            config,
            today,
            catalog,
            probe,
        }
    }

    pub fn verify(&self, folder: &CompanyFolder) -> Verification {
        let documents = match self.catalog.documents(&folder.path) {
            Ok(documents) => documents,
            Err(err) => {
                warn!(company = %folder.name, error = %err, "unable to list company folder");
                return Verification {
                    result: CompanyResult::processing_error(&folder.name, &err.to_string()),
                    events: vec![],
                };
            }
        };

        let grouped = self.group(&folder.name, &documents);
        let mut events = vec![];
        let result = match self.config.mode {
            VerificationMode::PositiveDebtCheck => {
                self.check_positive(folder, &grouped, &mut events)
            }
            VerificationMode::ExpiryCheck => self.check_expiry(folder, &grouped),
        };

        if !result.missing_types().is_empty() {
            let missing = result.missing_types().to_vec();
            info!(
                company = %folder.name,
                missing = %join(&missing),
                "certificates missing"
            );
            events.push(AuditEvent::MissingCertificates {
                company: folder.name.clone(),
                folder: folder.path.clone(),
                missing,
            });
        }
        info!(
            company = %folder.name,
            status = %result.overall_status(),
            "company verified"
        );
        Verification { result, events }
    }

    /// File names per configured certificate, in configured order.
    fn group<'d>(&self, company: &str, documents: &'d [String]) -> Vec<Vec<&'d str>> {
        let mut grouped = vec![vec![]; self.config.expected_files.len()];
        for name in documents {
            match classify(name, &self.config.expected_files) {
                Classification::Certificate(index) => {
                    debug!(
                        company,
                        file = %name,
                        certificate = %self.config.expected_files[index],
                        "classified"
                    );
                    grouped[index].push(name.as_str());
                }
                Classification::Unrecognized => debug!(company, file = %name, "unrecognized pdf"),
                Classification::Skipped => {}
            }
        }
        grouped
    }

    fn check_positive(
        &self,
        folder: &CompanyFolder,
        grouped: &[Vec<&str>],
        events: &mut Vec<AuditEvent>,
    ) -> CompanyResult {
        let mut presence = Vec::with_capacity(grouped.len());
        let mut adverse_finding = None;
        for (certificate, files) in self.config.expected_files.iter().zip(grouped) {
            let status = if files.is_empty() {
                CertificateStatus::Absent
            } else {
                CertificateStatus::Present
            };
            presence.push(CertificatePresence {
                certificate: certificate.clone(),
                status,
            });
            for name in files {
                let file = folder.path.join(name);
                if !self.contains_target(&folder.name, &file, events) {
                    continue;
                }
                warn!(
                    company = %folder.name,
                    certificate = %certificate,
                    file = %file.display(),
                    "adverse certificate"
                );
                events.push(AuditEvent::AdverseFinding {
                    company: folder.name.clone(),
                    certificate: certificate.clone(),
                    file,
                });
                if adverse_finding.is_none() {
                    adverse_finding = Some(certificate.clone());
                }
                break;
            }
        }
        CompanyResult::checked(&folder.name, presence, adverse_finding)
    }

    fn contains_target(&self, company: &str, file: &Path, events: &mut Vec<AuditEvent>) -> bool {
        match self.probe.contains_phrase(file, &self.config.target_line) {
            Ok(found) => found,
            Err(err) => {
                warn!(
                    company,
                    file = %file.display(),
                    error = %err,
                    "unreadable document treated as not positive"
                );
                events.push(AuditEvent::UnreadableDocument {
                    company: company.into(),
                    file: file.into(),
                    reason: err.to_string(),
                });
                false
            }
        }
    }

    fn check_expiry(&self, folder: &CompanyFolder, grouped: &[Vec<&str>]) -> CompanyResult {
        let presence = self
            .config
            .expected_files
            .iter()
            .zip(grouped)
            .map(|(certificate, files)| CertificatePresence {
                certificate: certificate.clone(),
                status: files
                    .iter()
                    .map(|name| expiry::evaluate(name, self.today))
                    .reduce(expiry::worst)
                    .unwrap_or(CertificateStatus::Absent),
            })
            .collect();
        CompanyResult::checked(&folder.name, presence, None)
    }
}

fn join(certificates: &[CertificateType]) -> String {
    certificates
        .iter()
        .map(CertificateType::label)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod verify_test {
    use super::*;
    use crate::{
        catalog::FsCatalog, config::DEFAULT_TARGET_LINE, error::ProbeError, model::OverallStatus,
        pdf::fixture, probe::PdfProbe,
    };
    use std::{collections::HashSet, fs, io};

    /// Answers from a fixed set of positive file names, fails on `broken` ones.
    struct NameProbe {
        positive: HashSet<&'static str>,
        broken: HashSet<&'static str>,
    }

    impl NameProbe {
        fn new(positive: &[&'static str], broken: &[&'static str]) -> NameProbe {
            NameProbe {
                positive: positive.iter().copied().collect(),
                broken: broken.iter().copied().collect(),
            }
        }
    }

    impl PhraseProbe for NameProbe {
        fn contains_phrase(&self, pdf_path: &Path, _: &str) -> Result<bool, ProbeError> {
            let name = pdf_path.file_name().unwrap().to_str().unwrap();
            if self.broken.contains(name) {
                return Err(ProbeError::Open {
                    path: pdf_path.into(),
                    source: io::Error::new(io::ErrorKind::Other, "broken"),
                });
            }
            Ok(self.positive.contains(name))
        }
    }

    struct FixedCatalog(Vec<&'static str>);

    impl Catalog for FixedCatalog {
        fn companies(&self, _: &Path) -> io::Result<Vec<CompanyFolder>> {
            Ok(vec![])
        }
        fn documents(&self, _: &Path) -> io::Result<Vec<String>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn folder() -> CompanyFolder {
        CompanyFolder::new(Path::new("/audit"), "ACME LTDA")
    }

    #[test]
    fn presence_tracks_files_and_missing_types() {
        let config = AuditConfig::default();
        let catalog = FixedCatalog(vec![
            "CND MUNICIPAL.pdf",
            "cnd rfb.PDF",
            "CND FGTS.docx",
            "contrato.pdf",
        ]);
        let probe = NameProbe::new(&[], &[]);
        let v = FolderVerifier::new(&config, today(), &catalog, &probe).verify(&folder());
        let r = v.result;
        assert_eq!(r.status_of(&"CND MUNICIPAL".into()), Some(CertificateStatus::Present));
        assert_eq!(r.status_of(&"CND RFB".into()), Some(CertificateStatus::Present));
        assert_eq!(r.status_of(&"CND FGTS".into()), Some(CertificateStatus::Absent));
        let missing: Vec<&str> = r.missing_types().iter().map(|c| c.label()).collect();
        assert_eq!(missing, vec!["CND FGTS", "CND PROC", "CND ESTADUAL"]);
        assert_eq!(r.overall_status(), OverallStatus::Incomplete);
        assert!(r.adverse_finding().is_none());
        assert!(matches!(
            v.events.last(),
            Some(AuditEvent::MissingCertificates { missing, .. }) if missing.len() == 3
        ));
    }

    #[test]
    fn earliest_configured_adverse_type_wins() {
        let config = AuditConfig::default();
        let catalog = FixedCatalog(vec![
            "a CND ESTADUAL.pdf",
            "b CND RFB.pdf",
            "CND MUNICIPAL.pdf",
            "CND FGTS.pdf",
            "CND PROC.pdf",
        ]);
        let probe = NameProbe::new(&["a CND ESTADUAL.pdf", "b CND RFB.pdf"], &[]);
        let v = FolderVerifier::new(&config, today(), &catalog, &probe).verify(&folder());
        assert_eq!(v.result.adverse_finding(), Some(&CertificateType::new("CND RFB")));
        assert_eq!(v.result.overall_status(), OverallStatus::Complete);
        let adverse = v
            .events
            .iter()
            .filter(|e| matches!(e, AuditEvent::AdverseFinding { .. }))
            .count();
        assert_eq!(adverse, 2);
    }

    #[test]
    fn unreadable_document_is_present_but_not_adverse() {
        let config = AuditConfig::default();
        let catalog = FixedCatalog(vec!["CND RFB.pdf"]);
        let probe = NameProbe::new(&[], &["CND RFB.pdf"]);
        let v = FolderVerifier::new(&config, today(), &catalog, &probe).verify(&folder());
        assert_eq!(v.result.status_of(&"CND RFB".into()), Some(CertificateStatus::Present));
        assert!(v.result.adverse_finding().is_none());
        assert!(matches!(v.events[0], AuditEvent::UnreadableDocument { .. }));
    }

    #[test]
    fn expiry_mode_keeps_worst_status_per_type() {
        let config = AuditConfig::default().with_mode(VerificationMode::ExpiryCheck);
        let catalog = FixedCatalog(vec![
            "CND RFB 01.01.2099.pdf",
            "CND RFB 01.01.2020.pdf",
            "CND FGTS 01.01.2099.pdf",
            "CND FGTS sem data.pdf",
            "CND PROC 32.13.2024.pdf",
            "CND MUNICIPAL 10.06.2024.pdf",
        ]);
        let probe = NameProbe::new(&["CND RFB 01.01.2020.pdf"], &[]);
        let r = FolderVerifier::new(&config, today(), &catalog, &probe)
            .verify(&folder())
            .result;
        assert_eq!(r.status_of(&"CND RFB".into()), Some(CertificateStatus::Expired));
        assert_eq!(r.status_of(&"CND FGTS".into()), Some(CertificateStatus::DateNotFound));
        assert_eq!(r.status_of(&"CND PROC".into()), Some(CertificateStatus::DateParseError));
        assert_eq!(r.status_of(&"CND MUNICIPAL".into()), Some(CertificateStatus::Valid));
        assert_eq!(r.status_of(&"CND ESTADUAL".into()), Some(CertificateStatus::Absent));
        assert!(r.adverse_finding().is_none());
        assert_eq!(r.missing_types(), &[CertificateType::new("CND ESTADUAL")]);
    }

    #[test]
    fn listing_failure_is_processing_error() {
        let config = AuditConfig::default();
        let dir = tempfile::tempdir().unwrap();
        let folder = CompanyFolder::new(dir.path(), "vanished");
        let v = FolderVerifier::new(&config, today(), &FsCatalog, &PdfProbe).verify(&folder);
        assert_eq!(v.result.overall_status(), OverallStatus::ProcessingError);
        assert_eq!(v.result.company_name(), "vanished");
        assert!(v.events.is_empty());
    }

    #[test]
    fn real_documents_on_disk() {
        let config = AuditConfig::default().with_expected_files(&["CND RFB", "CND ESTADUAL"]);
        let dir = tempfile::tempdir().unwrap();
        let folder = CompanyFolder::new(dir.path(), "ACME");
        fs::create_dir(&folder.path).unwrap();
        fixture::save(
            fixture::text_document(&["RECEITA FEDERAL", "CERTIDÃO NEGATIVA"]),
            &folder.path.join("CND RFB.pdf"),
        );
        fixture::save(
            fixture::text_document(&[DEFAULT_TARGET_LINE]),
            &folder.path.join("CND ESTADUAL.pdf"),
        );
        let r = FolderVerifier::new(&config, today(), &FsCatalog, &PdfProbe)
            .verify(&folder)
            .result;
        assert_eq!(r.adverse_finding(), Some(&CertificateType::new("CND ESTADUAL")));
        assert_eq!(r.overall_status(), OverallStatus::Complete);
    }
}
