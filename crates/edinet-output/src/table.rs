//! Tabular parse results.

use crate::export::{ExportError, ExportFormat, Exporter, csv_into_string};
use serde::Serialize;
use serde_json::{Map, Value};

/// Rows of flat JSON objects sharing one set of columns.
///
/// Columns appear in first-seen order; a row missing a column exports it as
/// `null` (JSON) or an empty field (CSV).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

impl ResultTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table with one row per record.
    pub fn from_records<T: Serialize>(records: &[T]) -> Result<Self, ExportError> {
        let mut table = Self::new();
        for record in records {
            table.push_row(object(record)?);
        }
        Ok(table)
    }

    /// Add a row made of the target's fields followed by the record's.
    ///
    /// A `None` record contributes no columns of its own; record fields seen
    /// in other rows are left empty for it.
    pub fn push<T: Serialize, R: Serialize>(
        &mut self,
        target: &T,
        record: Option<&R>,
    ) -> Result<(), ExportError> {
        let mut row = object(target)?;
        if let Some(record) = record {
            for (key, value) in object(record)? {
                row.insert(key, value);
            }
        }
        self.push_row(row);
        Ok(())
    }

    /// Add a row of already flattened values.
    pub fn push_row(&mut self, row: Map<String, Value>) {
        for key in row.keys() {
            if !self.columns.iter().any(|c| c == key) {
                self.columns.push(key.clone());
            }
        }
        self.rows.push(row);
    }

    /// Column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows as inserted.
    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows with every column present, in column order.
    fn complete_rows(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
                    .collect()
            })
            .collect()
    }
}

impl Exporter for ResultTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.write_record(&self.columns)?;
                for row in &self.rows {
                    wtr.write_record(
                        self.columns
                            .iter()
                            .map(|c| row.get(c).map(csv_field).unwrap_or_default()),
                    )?;
                }
                csv_into_string(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(&self.complete_rows())?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(&self.complete_rows())?),
        }
    }
}

fn object<T: Serialize>(value: &T) -> Result<Map<String, Value>, ExportError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(ExportError::InvalidFormat(format!(
            "expected a record with named fields, got {other}"
        ))),
    }
}

fn csv_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Target {
        doc_id: &'static str,
        sec_code: Option<&'static str>,
    }

    #[derive(Serialize)]
    struct Record {
        net_sales: Option<i64>,
        profit_loss: Option<i64>,
    }

    fn table() -> ResultTable {
        let mut table = ResultTable::new();
        table
            .push::<_, Record>(
                &Target {
                    doc_id: "S100AAAA",
                    sec_code: Some("13010"),
                },
                None,
            )
            .unwrap();
        table
            .push(
                &Target {
                    doc_id: "S100BBBB",
                    sec_code: None,
                },
                Some(&Record {
                    net_sales: Some(5000),
                    profit_loss: None,
                }),
            )
            .unwrap();
        table
    }

    #[test]
    fn test_columns_in_first_seen_order() {
        assert_eq!(
            table().columns(),
            ["doc_id", "sec_code", "net_sales", "profit_loss"]
        );
    }

    #[test]
    fn test_csv_fills_missing_fields() {
        let csv = table().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "doc_id,sec_code,net_sales,profit_loss");
        assert_eq!(lines[1], "S100AAAA,13010,,");
        assert_eq!(lines[2], "S100BBBB,,5000,");
    }

    #[test]
    fn test_json_has_null_for_failed_rows() {
        let json = table().export_to_string(ExportFormat::Json).unwrap();
        let rows: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["net_sales"], Value::Null);
        assert_eq!(rows[1]["net_sales"], 5000);
    }

    #[test]
    fn test_rejects_non_objects() {
        let mut table = ResultTable::new();
        assert!(matches!(
            table.push::<_, Record>(&42, None),
            Err(ExportError::InvalidFormat(_))
        ));
        assert!(table.is_empty());
    }
}
