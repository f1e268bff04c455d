//! Parser and mapper traits.

use crate::error::Result;
use edinet_data::DocumentList;
use edinet_data::xbrl::FactTable;
use serde::Serialize;
use std::path::Path;

/// A document selected for parsing.
pub trait DocumentTarget {
    /// Registry document id; also the name of the document's directory.
    fn doc_id(&self) -> &str;
}

/// Turns the facts of one instance into a record.
pub trait FactMapper: Send + Sync {
    /// Extracted record
    type Record: Serialize + Send + 'static;

    /// Map a fact table.
    ///
    /// # Errors
    /// Fails when a required fact is ambiguous or malformed.
    fn map(&self, facts: &FactTable) -> Result<Self::Record>;
}

/// A kind of document: how to pick it from a list and how to parse it.
pub trait DocumentParser: Send + Sync + 'static {
    /// Selected document
    type Target: DocumentTarget + Serialize + Send + 'static;
    /// Parsed record
    type Record: Serialize + Send + 'static;

    /// Documents of a day's list this parser handles, in list order.
    fn select_targets(&self, list: &DocumentList) -> Vec<Self::Target>;

    /// Parse one stored document directory.
    ///
    /// # Errors
    /// Fails when the expected rendition is missing or cannot be parsed.
    fn parse_dir(&self, dir: &Path) -> Result<Self::Record>;
}

/// Returns true if a registry security code matches a requested one.
///
/// The registry reports five digits (`72030`); four-digit codes (`7203`)
/// match on the leading digits.
pub fn sec_code_matches(sec_code: &str, wanted: &str) -> bool {
    sec_code == wanted || (wanted.len() == 4 && sec_code.len() == 5 && sec_code.starts_with(wanted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("72030", "72030", true)]
    #[case("72030", "7203", true)]
    #[case("72030", "7204", false)]
    #[case("72030", "720", false)]
    #[case("7203", "72030", false)]
    fn test_sec_code_matches(#[case] code: &str, #[case] wanted: &str, #[case] expected: bool) {
        assert_eq!(sec_code_matches(code, wanted), expected);
    }
}
