use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// One company's subfolder under the audited root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyFolder {
    pub name: String,
    pub path: PathBuf,
}

impl CompanyFolder {
    pub fn new(root: &Path, name: &str) -> CompanyFolder {
        CompanyFolder {
            name: name.into(),
            path: root.join(name),
        }
    }
}

/// Directory listing used by the batch.
pub trait Catalog: Send + Sync {
    /// Immediate subfolders of `root`; files in the root are not companies.
    fn companies(&self, root: &Path) -> io::Result<Vec<CompanyFolder>>;
    /// Names of the files directly inside a company folder.
    fn documents(&self, folder: &Path) -> io::Result<Vec<String>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FsCatalog;

impl Catalog for FsCatalog {
    fn companies(&self, root: &Path) -> io::Result<Vec<CompanyFolder>> {
        let mut companies = vec![];
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            // follows symlinks, a linked company folder still counts
            if entry.path().is_dir() {
                let name = entry.file_name().to_string_lossy().to_string();
                companies.push(CompanyFolder {
                    name,
                    path: entry.path(),
                });
            }
        }
        companies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(companies)
    }

    fn documents(&self, folder: &Path) -> io::Result<Vec<String>> {
        let mut documents = vec![];
        for entry in fs::read_dir(folder)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            documents.push(entry.file_name().to_string_lossy().to_string());
        }
        documents.sort();
        Ok(documents)
    }
}
