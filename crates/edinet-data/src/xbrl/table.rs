//! Fact tables and field lookup.

use super::facts::Fact;
use crate::error::{DataError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{LazyLock, Mutex, PoisonError};
use tracing::warn;

/// Compiled namespace patterns, keyed by the pattern as given
static NAMESPACE_PATTERNS: LazyLock<Mutex<HashMap<String, Regex>>> =
    LazyLock::new(Mutex::default);

/// `^(?:{pattern})`, compiled once per distinct pattern.
fn namespace_regex(pattern: &str) -> Result<Regex> {
    let mut cache = NAMESPACE_PATTERNS
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(re) = cache.get(pattern) {
        return Ok(re.clone());
    }
    let re = Regex::new(&format!("^(?:{pattern})"))?;
    cache.insert(pattern.to_string(), re.clone());
    Ok(re)
}

/// Ordered, duplicate-free facts of one instance.
///
/// Export tooling occasionally writes the same fact twice verbatim; such
/// copies are collapsed, keeping the first occurrence in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactTable {
    facts: Vec<Fact>,
}

impl FactTable {
    /// Build a table, dropping exact duplicates.
    pub fn from_facts(facts: impl IntoIterator<Item = Fact>) -> Self {
        let mut seen = HashSet::new();
        let facts = facts
            .into_iter()
            .filter(|fact| seen.insert(fact.clone()))
            .collect();
        Self { facts }
    }

    /// All facts in order.
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    /// Iterate over facts.
    pub fn iter(&self) -> std::slice::Iter<'_, Fact> {
        self.facts.iter()
    }

    /// Number of facts.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns true if the table holds no facts.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Every fact matching the query.
    ///
    /// `ns_pattern` is a regular expression anchored at the start of the
    /// namespace prefix, so `jpcrp` matches `jpcrp_cor` and
    /// `jpcrp030000-asr_E00001-000` alike.
    pub fn find_all(
        &self,
        ns_pattern: Option<&str>,
        tag: &str,
        context_id: Option<&str>,
    ) -> Result<Vec<&Fact>> {
        let namespace = ns_pattern.map(namespace_regex).transpose()?;
        Ok(self
            .facts
            .iter()
            .filter(|f| f.tag == tag)
            .filter(|f| context_id.is_none_or(|id| f.context.id == id))
            .filter(|f| {
                namespace
                    .as_ref()
                    .is_none_or(|re| re.is_match(&f.namespace_prefix))
            })
            .collect())
    }

    /// The single fact matching the query.
    ///
    /// # Errors
    /// Returns [`DataError::AmbiguousLookup`] when more than one fact matches.
    pub fn lookup(
        &self,
        ns_pattern: Option<&str>,
        tag: &str,
        context_id: Option<&str>,
    ) -> Result<Option<&Fact>> {
        let matches = self.find_all(ns_pattern, tag, context_id)?;
        match matches.as_slice() {
            [] => Ok(None),
            [fact] => Ok(Some(*fact)),
            _ => {
                warn!(
                    "Multiple rows exist! (namespace: {ns_pattern:?}, tag: {tag}, context: {context_id:?})"
                );
                Err(DataError::AmbiguousLookup {
                    namespace: ns_pattern.map(str::to_string),
                    tag: tag.to_string(),
                    context_id: context_id.map(str::to_string),
                    count: matches.len(),
                })
            }
        }
    }

    /// Normalized text of the matching fact.
    ///
    /// Newlines are removed; ideographic and non-breaking spaces become a
    /// plain space.
    pub fn get_text(
        &self,
        ns_pattern: Option<&str>,
        tag: &str,
        context_id: Option<&str>,
    ) -> Result<Option<String>> {
        Ok(self
            .lookup(ns_pattern, tag, context_id)?
            .and_then(|f| f.text.as_deref())
            .map(normalize_text))
    }

    /// Integer value of the matching fact.
    pub fn get_int(
        &self,
        ns_pattern: Option<&str>,
        tag: &str,
        context_id: Option<&str>,
    ) -> Result<Option<i64>> {
        self.get_text(ns_pattern, tag, context_id)?
            .map(|text| parse_number(tag, &text))
            .transpose()
    }

    /// Floating point value of the matching fact.
    pub fn get_float(
        &self,
        ns_pattern: Option<&str>,
        tag: &str,
        context_id: Option<&str>,
    ) -> Result<Option<f64>> {
        self.get_text(ns_pattern, tag, context_id)?
            .map(|text| parse_number(tag, &text))
            .transpose()
    }
}

impl<'a> IntoIterator for &'a FactTable {
    type Item = &'a Fact;
    type IntoIter = std::slice::Iter<'a, Fact>;

    fn into_iter(self) -> Self::IntoIter {
        self.facts.iter()
    }
}

/// Normalize raw fact text.
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .map(|c| match c {
            '\u{3000}' | '\u{a0}' => ' ',
            other => other,
        })
        .collect()
}

fn parse_number<T: std::str::FromStr>(tag: &str, text: &str) -> Result<T> {
    text.trim().parse().map_err(|_| DataError::Format {
        tag: tag.to_string(),
        value: text.to_string(),
    })
}
