//! Fact extraction.

use super::context::{Context, ContextMap};
use super::table::FactTable;
use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};

/// One reported data point with its context resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fact {
    /// Namespace prefix of the element (e.g. `jppfs_cor`)
    pub namespace_prefix: String,
    /// Local element name (e.g. `NetSales`)
    pub tag: String,
    /// Context the fact is reported in
    pub context: Context,
    /// Raw element text
    pub text: Option<String>,
    /// `unitRef` attribute
    pub unit: Option<String>,
}

impl Fact {
    /// Context id.
    pub fn context_id(&self) -> &str {
        &self.context.id
    }

    /// `prefix:tag`
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.namespace_prefix, self.tag)
    }
}

/// An element read from a selected namespace, before context resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFact {
    /// Namespace prefix
    pub namespace_prefix: String,
    /// Local element name
    pub tag: String,
    /// `contextRef` attribute
    pub context_ref: Option<String>,
    /// Leading text of the element
    pub text: Option<String>,
    /// `unitRef` attribute
    pub unit: Option<String>,
}

impl RawFact {
    /// Attach the referenced context.
    ///
    /// # Errors
    /// Returns [`DataError::UnresolvedContext`] when the element has no
    /// `contextRef` or the context is not declared.
    pub fn resolve(self, contexts: &ContextMap) -> Result<Fact> {
        let context = self
            .context_ref
            .as_deref()
            .and_then(|id| contexts.get(id))
            .cloned()
            .ok_or_else(|| DataError::UnresolvedContext {
                tag: format!("{}:{}", self.namespace_prefix, self.tag),
                context_ref: self.context_ref.clone(),
            })?;
        Ok(Fact {
            namespace_prefix: self.namespace_prefix,
            tag: self.tag,
            context,
            text: self.text,
            unit: self.unit,
        })
    }
}

/// Resolve contexts of every raw fact and build the deduplicated table.
pub fn extract_facts(
    raw: impl IntoIterator<Item = RawFact>,
    contexts: &ContextMap,
) -> Result<FactTable> {
    let facts = raw
        .into_iter()
        .map(|f| f.resolve(contexts))
        .collect::<Result<Vec<_>>>()?;
    Ok(FactTable::from_facts(facts))
}
