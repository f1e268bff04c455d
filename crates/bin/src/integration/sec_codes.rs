//! Security code lists.
//!
//! A code list is a CSV file with a `sec_code` column. Spreadsheet exports
//! often write codes as floats (`7203.0`), so a trailing fraction of zeros
//! is dropped.

use serde::Deserialize;
use std::error::Error;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CodeRow {
    sec_code: String,
}

fn normalize(code: &str) -> Option<String> {
    let code = code.trim();
    let code = code
        .split_once('.')
        .filter(|(_, frac)| frac.chars().all(|c| c == '0'))
        .map_or(code, |(int, _)| int);
    (!code.is_empty()).then(|| code.to_string())
}

/// Read the `sec_code` column of a CSV file.
pub(crate) fn load_sec_codes(path: &Path) -> Result<Vec<String>, Box<dyn Error>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut codes = Vec::new();
    for row in reader.deserialize::<CodeRow>() {
        if let Some(code) = normalize(&row?.sec_code) {
            codes.push(code);
        }
    }
    Ok(codes)
}

/// Split a comma separated list given on the command line.
pub(crate) fn parse_sec_code_list(list: &str) -> Vec<String> {
    list.split(',').filter_map(normalize).collect()
}
