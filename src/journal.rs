use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::Local;

use crate::verify::AuditEvent;

pub const ADVERSE_LOG: &str = "adverse_findings.log";
pub const MISSING_LOG: &str = "missing_files.log";

/// Appends adverse findings and missing certificate notices to plain text
/// logs in one directory.
#[derive(Debug, Clone)]
pub struct Journal {
    dir: PathBuf,
}

impl Journal {
    pub fn new(dir: &Path) -> io::Result<Journal> {
        fs::create_dir_all(dir)?;
        Ok(Journal { dir: dir.into() })
    }

    pub fn record(&self, event: &AuditEvent) -> io::Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        match event {
            AuditEvent::AdverseFinding {
                company,
                certificate,
                file,
            } => self.append(
                ADVERSE_LOG,
                &format!(
                    "[{}] Company: {}, Certificate: {}, File: {}",
                    timestamp,
                    company,
                    certificate,
                    file.display()
                ),
            ),
            AuditEvent::MissingCertificates {
                folder, missing, ..
            } => {
                let missing: Vec<&str> = missing.iter().map(|c| c.label()).collect();
                self.append(
                    MISSING_LOG,
                    &format!(
                        "[{}] Folder: {}, Missing: {}",
                        timestamp,
                        folder.display(),
                        missing.join(", ")
                    ),
                )
            }
            AuditEvent::UnreadableDocument { .. } => Ok(()),
        }
    }

    fn append(&self, log: &str, line: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(log))?;
        writeln!(file, "{}", line)
    }
}
