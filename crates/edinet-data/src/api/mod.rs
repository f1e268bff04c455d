//! EDINET document API.
//!
//! This module provides:
//! - Typed document list responses
//! - Classification of every response into success, skip, retry or fatal
//! - A retry state machine with an injectable sleeper
//! - A sequential, throttled fetch client
//!
//! # Example
//!
//! ```no_run
//! use edinet_data::api::{ClientConfig, DocType, EdinetClient, ListDetail, RetryPolicy};
//! use chrono::NaiveDate;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::default().with_retry(RetryPolicy::every(Duration::from_secs(60)));
//!     let client = EdinetClient::with_config(config)?;
//!
//!     let day = NaiveDate::from_ymd_opt(2023, 6, 28).unwrap();
//!     if let Some(fetched) = client.fetch_document_list(day, ListDetail::Full).await? {
//!         for doc in &fetched.list.results {
//!             if let Some(bytes) = client.fetch_document(&doc.doc_id, DocType::Main).await? {
//!                 println!("{}: {} bytes", doc.doc_id, bytes.len());
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod client;
pub mod retry;
pub mod transport;
pub mod types;

pub use classify::{Expectation, FetchOutcome, classify};
pub use client::{ClientConfig, EDINET_BASE_URL, EdinetClient};
pub use retry::{
    DEFAULT_REQUEST_DELAY, Resolution, RetryController, RetryPolicy, RetryState, Sleeper,
    TokioSleeper,
};
pub use transport::{HttpTransport, RawResponse, Transport};
pub use types::{
    DocType, DocumentIdentifier, DocumentList, DocumentSummary, FetchedList, ListDetail,
    ListMetadata, ResultSet,
};
