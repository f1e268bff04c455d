//! Error types for parsing.

use edinet_data::DataError;
use edinet_output::ExportError;
use thiserror::Error;

/// Result type for parse operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors that can occur while parsing stored or fetched documents.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Fetching, storage or XBRL extraction failed
    #[error(transparent)]
    Data(#[from] DataError),

    /// Writing a debug dump failed
    #[error("Debug output error: {0}")]
    Export(#[from] ExportError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking worker panicked or was cancelled
    #[error("Worker failed for {doc_id}: {reason}")]
    Worker {
        /// Document the worker was parsing
        doc_id: String,
        /// Panic message or cancellation reason
        reason: String,
    },
}

impl ParseError {
    /// Returns true if the error concerns the content of one document rather
    /// than the environment.
    pub const fn is_document_error(&self) -> bool {
        match self {
            Self::Data(e) => {
                e.is_structural()
                    || matches!(
                        e,
                        DataError::AmbiguousLookup { .. }
                            | DataError::Format { .. }
                            | DataError::DocumentNotFound(_)
                    )
            }
            Self::Worker { .. } => true,
            Self::Export(_) | Self::Io(_) => false,
        }
    }
}
