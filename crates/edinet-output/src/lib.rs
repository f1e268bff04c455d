#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/edinet/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod facts;
pub mod table;

pub use export::{ExportError, ExportFormat, Exporter};
pub use facts::{FactRow, write_facts_csv};
pub use table::ResultTable;
