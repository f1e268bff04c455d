//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while fetching, storing or parsing EDINET documents.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error (connection, TLS handshake, timeout, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// The registry rejected a request and the rejection is not retryable
    #[error("Failed to fetch {target}: {message}")]
    RemoteRejection {
        /// What was being fetched (document list day or document id/type)
        target: String,
        /// Formatted server message, including the status when known
        message: String,
        /// Status reported by the registry, if any
        status: Option<u16>,
    },

    /// Archive does not contain exactly one primary XBRL instance
    #[error("Archive entry error: {0}")]
    ArchiveEntry(String),

    /// Malformed XBRL instance filename
    #[error("Unsupported XBRL filename ({name}): {reason}")]
    Filename {
        /// The offending filename
        name: String,
        /// Which part failed to decode
        reason: String,
    },

    /// Malformed context declaration
    #[error("Invalid context {id}: {reason}")]
    Context {
        /// Context id
        id: String,
        /// What is wrong with it
        reason: String,
    },

    /// A fact references a context that is missing or not declared
    #[error("Unresolved context reference on {tag}: {context_ref:?}")]
    UnresolvedContext {
        /// Tag of the fact (prefixed)
        tag: String,
        /// The reference found on the element, if any
        context_ref: Option<String>,
    },

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Zip archive error
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// More than one fact matched a lookup that expects a single row
    #[error("Multiple rows match {tag} (namespace: {namespace:?}, context: {context_id:?}): {count} rows")]
    AmbiguousLookup {
        /// Namespace pattern used
        namespace: Option<String>,
        /// Tag looked up
        tag: String,
        /// Context id used
        context_id: Option<String>,
        /// Number of matching rows
        count: usize,
    },

    /// Text could not be converted to the requested number type
    #[error("Format error: cannot convert {value:?} for {tag}")]
    Format {
        /// Tag looked up
        tag: String,
        /// Normalized text that failed to parse
        value: String,
    },

    /// Invalid namespace pattern
    #[error("Invalid namespace pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Expected document file is not in the store
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// Returns true for errors caused by the structure of a document rather
    /// than by I/O or the network.
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::ArchiveEntry(_)
                | Self::Filename { .. }
                | Self::Context { .. }
                | Self::UnresolvedContext { .. }
                | Self::XmlParse(_)
                | Self::Zip(_)
        )
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<quick_xml::Error> for DataError {
    fn from(err: quick_xml::Error) -> Self {
        Self::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DataError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::XmlParse(err.to_string())
    }
}
