//! Raw fact dumps.

use crate::export::{ExportError, ExportFormat, Exporter, csv_into_string};
use edinet_data::xbrl::{Fact, FactTable};
use serde::Serialize;
use std::path::Path;

/// One fact flattened for export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactRow<'a> {
    /// Namespace prefix
    pub ns_prefix: &'a str,
    /// Local element name
    pub tag: &'a str,
    /// Context id
    pub context_id: &'a str,
    /// Instant date, for instant contexts
    pub instant: Option<String>,
    /// Start date, for duration contexts
    pub start_date: Option<String>,
    /// End date, for duration contexts
    pub end_date: Option<String>,
    /// Whether the context is non-consolidated
    pub non_consolidated: bool,
    /// Raw text
    pub text: Option<&'a str>,
    /// Unit reference
    pub unit: Option<&'a str>,
}

impl<'a> From<&'a Fact> for FactRow<'a> {
    fn from(fact: &'a Fact) -> Self {
        let period = &fact.context.period;
        Self {
            ns_prefix: &fact.namespace_prefix,
            tag: &fact.tag,
            context_id: fact.context_id(),
            instant: period.instant().map(|d| d.to_string()),
            start_date: period.start().map(|d| d.to_string()),
            end_date: period.end().map(|d| d.to_string()),
            non_consolidated: fact.context.is_non_consolidated(),
            text: fact.text.as_deref(),
            unit: fact.unit.as_deref(),
        }
    }
}

impl Exporter for FactTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let rows: Vec<FactRow<'_>> = self.iter().map(FactRow::from).collect();
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for row in &rows {
                    wtr.serialize(row)?;
                }
                csv_into_string(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(&rows)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(&rows)?),
        }
    }
}

/// Write every fact of a table as CSV.
pub fn write_facts_csv(facts: &FactTable, path: &Path) -> Result<(), ExportError> {
    facts.export_to_file(path, ExportFormat::Csv)
}
