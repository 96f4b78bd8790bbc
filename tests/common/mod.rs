#![allow(dead_code)]

use std::{fs, path::Path};

use tempfile::TempDir;

#[path = "../../src/pdf/fixture.rs"]
mod fixture;

/// Saves a one-font document with one page per entry of `pages`.
pub fn write_pdf(path: &Path, pages: &[&str]) {
    fixture::save(fixture::text_document(pages), path);
}

/// A root folder with company subfolders built on demand.
pub struct AuditTree {
    tmp: TempDir,
}

impl AuditTree {
    pub fn new() -> Self {
        AuditTree {
            tmp: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn company(&self, name: &str) -> &Self {
        fs::create_dir_all(self.root().join(name)).expect("create company folder");
        self
    }

    /// Empty file, enough for classification and expiry checks.
    pub fn touch(&self, company: &str, file: &str) -> &Self {
        self.company(company);
        fs::write(self.root().join(company).join(file), b"").expect("write file");
        self
    }

    pub fn pdf(&self, company: &str, file: &str, pages: &[&str]) -> &Self {
        self.company(company);
        write_pdf(&self.root().join(company).join(file), pages);
        self
    }
}
