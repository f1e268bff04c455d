#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/edinet/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod api;
pub mod download;
pub mod error;
pub mod history;
pub mod store;
pub mod xbrl;

pub use api::{ClientConfig, DocType, DocumentList, DocumentSummary, EdinetClient, RetryPolicy};
pub use download::{DownloadFilter, DownloadSummary, Downloader};
pub use error::{DataError, Result};
pub use history::{HistoryStore, new_documents};
pub use store::DocumentStore;
pub use xbrl::{Fact, FactTable, parse_archive};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
