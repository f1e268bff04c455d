//! Request and response types of the EDINET document API.

use chrono::{NaiveDate, NaiveDateTime};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Rendition of a filed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum DocType {
    /// Main bundle (XBRL + audit report zip)
    #[display("main")]
    Main,
    /// PDF rendition
    #[display("pdf")]
    Pdf,
    /// Attachments (zip)
    #[display("attachment")]
    Attachment,
    /// English translation (zip)
    #[display("english")]
    English,
}

impl DocType {
    /// Every rendition, in API code order.
    pub const ALL: [Self; 4] = [Self::Main, Self::Pdf, Self::Attachment, Self::English];

    /// Numeric code used by the `type` query parameter.
    pub const fn code(&self) -> u8 {
        match self {
            Self::Main => 1,
            Self::Pdf => 2,
            Self::Attachment => 3,
            Self::English => 4,
        }
    }

    /// Parse the numeric API code.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Main),
            2 => Some(Self::Pdf),
            3 => Some(Self::Attachment),
            4 => Some(Self::English),
            _ => None,
        }
    }

    /// File extension of the stored blob.
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Main | Self::Attachment | Self::English => "zip",
        }
    }

    /// Content type the registry sends for a successful download.
    pub const fn expected_content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Main | Self::Attachment | Self::English => "application/octet-stream",
        }
    }
}

/// Identifies one downloadable artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display("document (doc_id: {doc_id}, doc_type: {})", doc_type.code())]
pub struct DocumentIdentifier {
    /// Registry document id (e.g. `S100ABCD`)
    pub doc_id: String,
    /// Requested rendition
    pub doc_type: DocType,
}

impl DocumentIdentifier {
    /// Create a new identifier.
    pub fn new(doc_id: impl Into<String>, doc_type: DocType) -> Self {
        Self {
            doc_id: doc_id.into(),
            doc_type,
        }
    }
}

/// Level of detail of a document list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum ListDetail {
    /// Metadata only (`type=1`)
    #[display("meta-only")]
    MetaOnly,
    /// Metadata and the list of submitted documents (`type=2`)
    #[default]
    #[display("full")]
    Full,
}

impl ListDetail {
    /// Numeric code used by the `type` query parameter.
    pub const fn code(&self) -> u8 {
        match self {
            Self::MetaOnly => 1,
            Self::Full => 2,
        }
    }
}

/// Document list for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentList {
    /// Response metadata
    pub metadata: ListMetadata,
    /// Submitted documents (empty for meta-only requests)
    #[serde(default)]
    pub results: Vec<DocumentSummary>,
}

impl DocumentList {
    /// Number of documents the registry reports for the day.
    pub fn result_count(&self) -> u32 {
        self.metadata
            .resultset
            .as_ref()
            .map_or(self.results.len() as u32, |r| r.count)
    }
}

/// A document list together with the exact body it was parsed from.
///
/// The body is what gets written to disk, so fields the typed list does
/// not model survive.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedList {
    /// Parsed list
    pub list: DocumentList,
    /// Response body as received
    pub raw: Vec<u8>,
}

impl FetchedList {
    /// Parse a response body, keeping the bytes.
    pub fn from_body(raw: Vec<u8>) -> serde_json::Result<Self> {
        let list = serde_json::from_slice(&raw)?;
        Ok(Self { list, raw })
    }
}

/// Metadata block of a document list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMetadata {
    /// Title of the response
    #[serde(default)]
    pub title: Option<String>,
    /// Result set summary
    #[serde(default)]
    pub resultset: Option<ResultSet>,
    /// Processing timestamp reported by the registry
    #[serde(default)]
    pub process_date_time: Option<String>,
    /// Status code (the registry sends it as a string)
    pub status: String,
    /// Status message
    #[serde(default)]
    pub message: String,
}

/// Result set summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Number of documents submitted on the day
    pub count: u32,
}

/// One entry of a document list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    /// Sequence number within the day (1-based)
    pub seq_number: u32,
    /// Registry document id
    #[serde(rename = "docID")]
    pub doc_id: String,
    /// Filer code
    #[serde(default)]
    pub edinet_code: Option<String>,
    /// Security code (5 digits) of the filer, if listed
    #[serde(default)]
    pub sec_code: Option<String>,
    /// Filer name
    #[serde(default)]
    pub filer_name: Option<String>,
    /// Cabinet ordinance code
    #[serde(default)]
    pub ordinance_code: Option<String>,
    /// Form code
    #[serde(default)]
    pub form_code: Option<String>,
    /// Document type code (e.g. `120` for securities reports)
    #[serde(default)]
    pub doc_type_code: Option<String>,
    /// Period start (ISO date)
    #[serde(default)]
    pub period_start: Option<String>,
    /// Period end (ISO date)
    #[serde(default)]
    pub period_end: Option<String>,
    /// Submission timestamp (`YYYY-MM-DD HH:MM`)
    #[serde(default)]
    pub submit_date_time: Option<String>,
    /// Free-form description of the document
    #[serde(default)]
    pub doc_description: Option<String>,
    /// `"1"` when a PDF rendition exists
    #[serde(default)]
    pub pdf_flag: Option<String>,
    /// `"1"` when attachments exist
    #[serde(default)]
    pub attach_doc_flag: Option<String>,
    /// `"1"` when an English rendition exists
    #[serde(default)]
    pub english_doc_flag: Option<String>,
}

impl DocumentSummary {
    /// Parsed submission timestamp.
    pub fn submitted_at(&self) -> Option<NaiveDateTime> {
        let raw = self.submit_date_time.as_deref()?;
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
            .ok()
    }

    /// Submission date (date part of the timestamp).
    pub fn submit_date(&self) -> Option<NaiveDate> {
        self.submitted_at().map(|dt| dt.date())
    }

    /// Returns true if the registry offers the given rendition.
    pub fn has_rendition(&self, doc_type: DocType) -> bool {
        let flag = match doc_type {
            DocType::Main => return true,
            DocType::Pdf => &self.pdf_flag,
            DocType::Attachment => &self.attach_doc_flag,
            DocType::English => &self.english_doc_flag,
        };
        flag.as_deref() == Some("1")
    }
}
