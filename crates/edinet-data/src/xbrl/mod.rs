//! XBRL fact extraction for EDINET instances.
//!
//! An EDINET document archive carries one primary instance under
//! `XBRL/PublicDoc/`. Parsing it produces a [`FactTable`]: every element of
//! the taxonomy namespaces relevant to the filing, with its context resolved.
//!
//! # Example
//!
//! ```no_run
//! use edinet_data::xbrl::parse_archive;
//!
//! # fn main() -> edinet_data::Result<()> {
//! let facts = parse_archive("S100ABCD_1.zip")?;
//! let sales = facts.get_int(Some("jppfs_cor"), "NetSales", Some("CurrentYearDuration"))?;
//! println!("net sales: {sales:?}");
//! # Ok(())
//! # }
//! ```

mod archive;
mod context;
mod facts;
mod filename;
mod instance;
mod namespace;
mod table;

#[cfg(test)]
pub(crate) use archive::testing;

pub use archive::{
    PUBLIC_DOC_DIR, locate_instance, open_archive, parse_archive, read_archive, read_archive_bytes,
};
pub use context::{
    Consolidation, Context, ContextMap, NON_CONSOLIDATED_MARKER, Period, RawContext,
    resolve_contexts,
};
pub use facts::{Fact, RawFact, extract_facts};
pub use filename::FilenameMetadata;
pub use instance::{InstanceScan, XBRLI_NS, XbrlInstance, parse_instance, scan_instance};
pub use namespace::{
    DEI_PREFIX, PFS_PREFIX, TargetNamespace, candidate_prefixes, select_namespaces,
};
pub use table::{FactTable, normalize_text};
