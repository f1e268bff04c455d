//! On-disk layout of downloaded documents.
//!
//! ```text
//! {root}/{YYYY-MM-DD}/doc_list.json
//! {root}/{YYYY-MM-DD}/{doc_id}/{doc_id}_{type}.{zip|pdf}
//! ```

use crate::api::{DocType, DocumentList};
use crate::error::Result;
use chrono::NaiveDate;
use std::fs;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

/// Name of the per-day document list file
pub const LIST_FILE: &str = "doc_list.json";

/// Directory tree holding document lists and downloaded renditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    /// Store rooted at `root`. Nothing is created until something is saved.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of one day.
    pub fn day_dir(&self, date: NaiveDate) -> PathBuf {
        self.root.join(date.to_string())
    }

    /// Path of a day's document list.
    pub fn list_path(&self, date: NaiveDate) -> PathBuf {
        self.day_dir(date).join(LIST_FILE)
    }

    /// Directory of one document.
    pub fn doc_dir(&self, date: NaiveDate, doc_id: &str) -> PathBuf {
        self.day_dir(date).join(doc_id)
    }

    /// Path of one rendition of a document.
    pub fn document_path(&self, date: NaiveDate, doc_id: &str, doc_type: DocType) -> PathBuf {
        self.doc_dir(date, doc_id)
            .join(document_file_name(doc_id, doc_type))
    }

    /// Empty (or create) a day's directory.
    pub fn reset_day_dir(&self, date: NaiveDate) -> Result<PathBuf> {
        let dir = self.day_dir(date);
        recreate_dir(&dir)?;
        Ok(dir)
    }

    /// Empty (or create) a document's directory.
    pub fn reset_doc_dir(&self, date: NaiveDate, doc_id: &str) -> Result<PathBuf> {
        let dir = self.doc_dir(date, doc_id);
        recreate_dir(&dir)?;
        Ok(dir)
    }

    /// Write a day's document list exactly as the registry sent it.
    pub fn save_list(&self, date: NaiveDate, raw: &[u8]) -> Result<PathBuf> {
        let path = self.list_path(date);
        fs::create_dir_all(self.day_dir(date))?;
        fs::write(&path, raw)?;
        Ok(path)
    }

    /// Read a day's document list; `None` if it was never saved.
    pub fn load_list(&self, date: NaiveDate) -> Result<Option<DocumentList>> {
        let file = match fs::File::open(self.list_path(date)) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_reader(BufReader::new(file))?))
    }

    /// Write one rendition, creating the document directory if needed.
    pub fn save_document(
        &self,
        date: NaiveDate,
        doc_id: &str,
        doc_type: DocType,
        bytes: &[u8],
    ) -> Result<PathBuf> {
        fs::create_dir_all(self.doc_dir(date, doc_id))?;
        let path = self.document_path(date, doc_id, doc_type);
        fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// `{doc_id}_{type}.{ext}`
pub fn document_file_name(doc_id: &str, doc_type: DocType) -> String {
    format!("{doc_id}_{}.{}", doc_type.code(), doc_type.extension())
}

/// First file in `dir` named `*_{type}.{ext}`.
pub fn find_rendition(dir: &Path, doc_type: DocType) -> Result<Option<PathBuf>> {
    let suffix = format!("_{}.{}", doc_type.code(), doc_type.extension());
    let mut matches = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(&suffix))
        {
            matches.push(path);
        }
    }
    matches.sort();
    Ok(matches.into_iter().next())
}

fn recreate_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    fs::create_dir_all(dir)?;
    Ok(())
}
