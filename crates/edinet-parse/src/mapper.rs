//! Lookup helpers shared by mappers.

use crate::error::Result;
use edinet_data::xbrl::{FactTable, NON_CONSOLIDATED_MARKER};

/// Balance sheet context of the reported year
pub const CURRENT_YEAR_INSTANT: &str = "CurrentYearInstant";

/// Income and cash flow context of the reported year
pub const CURRENT_YEAR_DURATION: &str = "CurrentYearDuration";

/// `{context}_NonConsolidatedMember`
pub fn non_consolidated(context_id: &str) -> String {
    format!("{context_id}_{NON_CONSOLIDATED_MARKER}")
}

/// Integer value in `context_id`, falling back to its non-consolidated
/// counterpart when the consolidated figure is not reported.
pub fn int_with_fallback(
    facts: &FactTable,
    ns_pattern: &str,
    tag: &str,
    context_id: &str,
) -> Result<Option<i64>> {
    if let Some(value) = facts.get_int(Some(ns_pattern), tag, Some(context_id))? {
        return Ok(Some(value));
    }
    Ok(facts.get_int(Some(ns_pattern), tag, Some(&non_consolidated(context_id)))?)
}

/// Floating point counterpart of [`int_with_fallback`].
pub fn float_with_fallback(
    facts: &FactTable,
    ns_pattern: &str,
    tag: &str,
    context_id: &str,
) -> Result<Option<f64>> {
    if let Some(value) = facts.get_float(Some(ns_pattern), tag, Some(context_id))? {
        return Ok(Some(value));
    }
    Ok(facts.get_float(Some(ns_pattern), tag, Some(&non_consolidated(context_id)))?)
}
