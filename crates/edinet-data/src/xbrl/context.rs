//! Reporting contexts.
//!
//! Every fact in an instance points at a context declaring the period it
//! covers and, through the context id, its consolidation scope.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Marker in context ids of non-consolidated (parent-only) figures
pub const NON_CONSOLIDATED_MARKER: &str = "NonConsolidatedMember";

/// Period covered by a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Period {
    /// Point in time (balance sheet items)
    Instant(NaiveDate),
    /// Span of time (income and cash flow items)
    Duration {
        /// First day
        start: NaiveDate,
        /// Last day
        end: NaiveDate,
    },
}

impl Period {
    /// Instant date, if this is an instant.
    pub const fn instant(&self) -> Option<NaiveDate> {
        match self {
            Self::Instant(date) => Some(*date),
            Self::Duration { .. } => None,
        }
    }

    /// Start date, if this is a duration.
    pub const fn start(&self) -> Option<NaiveDate> {
        match self {
            Self::Instant(_) => None,
            Self::Duration { start, .. } => Some(*start),
        }
    }

    /// End date, if this is a duration.
    pub const fn end(&self) -> Option<NaiveDate> {
        match self {
            Self::Instant(_) => None,
            Self::Duration { end, .. } => Some(*end),
        }
    }

    /// Returns true for instants.
    pub const fn is_instant(&self) -> bool {
        matches!(self, Self::Instant(_))
    }
}

/// Consolidation scope of a context.
///
/// Only the non-consolidated case is marked in EDINET context ids; everything
/// else stays unspecified rather than being asserted as consolidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Consolidation {
    /// Parent-only figures
    NonConsolidated,
    /// Not marked
    #[default]
    Unspecified,
}

/// A resolved reporting context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Context {
    /// Context id (e.g. `CurrentYearInstant_NonConsolidatedMember`)
    pub id: String,
    /// Period covered
    pub period: Period,
    /// Consolidation scope
    pub consolidation: Consolidation,
}

impl Context {
    /// Returns true for non-consolidated contexts.
    pub fn is_non_consolidated(&self) -> bool {
        self.consolidation == Consolidation::NonConsolidated
    }
}

/// A context as declared in the instance, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawContext {
    /// `id` attribute
    pub id: String,
    /// `xbrli:instant` text
    pub instant: Option<String>,
    /// `xbrli:startDate` text
    pub start_date: Option<String>,
    /// `xbrli:endDate` text
    pub end_date: Option<String>,
}

impl RawContext {
    /// Validate and resolve the declaration.
    ///
    /// # Errors
    /// Returns [`DataError::Context`] unless exactly one of an instant or a
    /// start/end pair is declared, or when a date does not parse.
    pub fn resolve(self) -> Result<Context> {
        let period = match (&self.instant, &self.start_date, &self.end_date) {
            (Some(instant), None, None) => Period::Instant(self.parse_date(instant)?),
            (None, Some(start), Some(end)) => Period::Duration {
                start: self.parse_date(start)?,
                end: self.parse_date(end)?,
            },
            (None, None, None) => return Err(self.error("no period declared")),
            (Some(_), _, _) => return Err(self.error("both instant and duration declared")),
            (None, _, _) => return Err(self.error("incomplete duration")),
        };
        let consolidation = if self.id.contains(NON_CONSOLIDATED_MARKER) {
            Consolidation::NonConsolidated
        } else {
            Consolidation::Unspecified
        };
        Ok(Context {
            id: self.id,
            period,
            consolidation,
        })
    }

    fn parse_date(&self, raw: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|e| self.error(format!("invalid date {raw:?}: {e}")))
    }

    fn error(&self, reason: impl Into<String>) -> DataError {
        DataError::Context {
            id: self.id.clone(),
            reason: reason.into(),
        }
    }
}

/// Contexts of one instance, keyed by id.
pub type ContextMap = HashMap<String, Context>;

/// Resolve every declared context.
///
/// Ids are expected to be unique; if one repeats, the last declaration wins.
pub fn resolve_contexts(raw: impl IntoIterator<Item = RawContext>) -> Result<ContextMap> {
    let mut contexts = ContextMap::new();
    for declaration in raw {
        let context = declaration.resolve()?;
        if let Some(previous) = contexts.insert(context.id.clone(), context) {
            debug!("Duplicate context id {}, keeping the last declaration", previous.id);
        }
    }
    Ok(contexts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(id: &str, date: &str) -> RawContext {
        RawContext {
            id: id.to_string(),
            instant: Some(date.to_string()),
            ..Default::default()
        }
    }

    fn duration(id: &str, start: &str, end: &str) -> RawContext {
        RawContext {
            id: id.to_string(),
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
            ..Default::default()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_instant_and_duration() {
        let contexts = resolve_contexts([
            instant("CurrentYearInstant", "2023-03-31"),
            duration("CurrentYearDuration", "2022-04-01", "2023-03-31"),
        ])
        .unwrap();

        let ins = &contexts["CurrentYearInstant"];
        assert_eq!(ins.period, Period::Instant(date(2023, 3, 31)));
        assert!(ins.period.is_instant());
        assert_eq!(ins.period.start(), None);

        let dur = &contexts["CurrentYearDuration"];
        assert!(!dur.period.is_instant());
        assert_eq!(dur.period.instant(), None);
        assert_eq!(dur.period.start(), Some(date(2022, 4, 1)));
        assert_eq!(dur.period.end(), Some(date(2023, 3, 31)));
    }

    #[test]
    fn test_consolidation_marker() {
        let contexts = resolve_contexts([
            instant("CurrentYearInstant_NonConsolidatedMember", "2023-03-31"),
            instant("CurrentYearInstant", "2023-03-31"),
        ])
        .unwrap();
        assert!(contexts["CurrentYearInstant_NonConsolidatedMember"].is_non_consolidated());
        assert_eq!(
            contexts["CurrentYearInstant"].consolidation,
            Consolidation::Unspecified
        );
    }

    #[test]
    fn test_rejects_both_and_neither() {
        let both = RawContext {
            id: "Both".into(),
            instant: Some("2023-03-31".into()),
            start_date: Some("2022-04-01".into()),
            end_date: Some("2023-03-31".into()),
        };
        assert!(matches!(both.resolve(), Err(DataError::Context { .. })));

        let neither = RawContext {
            id: "Neither".into(),
            ..Default::default()
        };
        assert!(matches!(neither.resolve(), Err(DataError::Context { .. })));

        let half = RawContext {
            id: "Half".into(),
            start_date: Some("2022-04-01".into()),
            ..Default::default()
        };
        assert!(matches!(half.resolve(), Err(DataError::Context { .. })));
    }

    #[test]
    fn test_invalid_date() {
        assert!(instant("Bad", "2023-02-30").resolve().is_err());
    }

    #[test]
    fn test_duplicate_id_last_wins() {
        let contexts = resolve_contexts([
            instant("Dup", "2022-03-31"),
            duration("Dup", "2022-04-01", "2023-03-31"),
        ])
        .unwrap();
        assert_eq!(contexts.len(), 1);
        assert!(!contexts["Dup"].period.is_instant());
    }
}
