#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/edinet/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod checker;
pub mod error;
pub mod financials;
pub mod holdings;
pub mod mapper;
pub mod orchestrator;
pub mod parser;
pub mod sec_report;

#[cfg(test)]
mod testing;

pub use checker::{HoldingReport, HoldingsChecker};
pub use error::{ParseError, Result};
pub use financials::{BasicFinancials, BasicFinancialsMapper};
pub use holdings::{LargeHolding, LargeHoldingMapper};
pub use orchestrator::{ParallelParser, ParsedDocument, result_table};
pub use parser::{DocumentParser, DocumentTarget, FactMapper, sec_code_matches};
pub use sec_report::{DebugOutput, SecuritiesReportParser, SecuritiesReportTarget};
