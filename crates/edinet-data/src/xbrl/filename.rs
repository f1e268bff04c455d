//! Decoding of EDINET XBRL instance filenames.
//!
//! Instance files carry their structural metadata in a fixed-width name:
//!
//! ```text
//! jpcrp030000-asr-001_X99999-000_2012-03-31_01_2012-06-28.xbrl
//!   │  │      │   │   │      │   │          │  └ submission date
//!   │  │      │   │   │      │   │          └ submission sequence
//!   │  │      │   │   │      │   └ period end (or obligation date)
//!   │  │      │   │   │      └ additional number
//!   │  │      │   │   └ filer / fund code
//!   │  │      │   └ serial number
//!   │  │      └ report code
//!   │  └ style code
//!   └ cabinet order code
//! ```

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::str::FromStr;

const CABINET_ORDER: Range<usize> = 2..5;
const STYLE: Range<usize> = 5..11;
const REPORT: Range<usize> = 12..15;
const SERIAL: Range<usize> = 16..19;
const FILER: Range<usize> = 20..26;
const ADDITIONAL: Range<usize> = 27..30;
const PERIOD_END: Range<usize> = 31..41;
const SUBMISSION_SEQUENCE: Range<usize> = 42..44;
const SUBMISSION_DATE: Range<usize> = 45..55;

/// Metadata decoded from an instance filename.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilenameMetadata {
    /// Cabinet ordinance abbreviation (e.g. `crp`)
    pub cabinet_order_code: String,
    /// Style abbreviation (e.g. `030000`)
    pub style_code: String,
    /// Report abbreviation (e.g. `asr`)
    pub report_code: String,
    /// Report serial number
    pub serial_number: u16,
    /// Filer code or fund code
    pub filer_code: String,
    /// Additional number
    pub additional_number: u16,
    /// End of the reporting period, or the date the obligation arose
    pub period_end_date: NaiveDate,
    /// How many times the report has been submitted
    pub submission_sequence: u8,
    /// Submission date
    pub submission_date: NaiveDate,
}

impl FilenameMetadata {
    /// Decode a filename (without directory components).
    ///
    /// # Errors
    /// Returns [`DataError::Filename`] when the name does not start with `jp`
    /// or any field fails to decode.
    pub fn parse(name: &str) -> Result<Self> {
        if !name.starts_with("jp") {
            return Err(filename_error(name, "does not start with 'jp'"));
        }
        Ok(Self {
            cabinet_order_code: field(name, CABINET_ORDER, "cabinet order code")?.to_string(),
            style_code: field(name, STYLE, "style code")?.to_string(),
            report_code: field(name, REPORT, "report code")?.to_string(),
            serial_number: number(name, SERIAL, "serial number")?,
            filer_code: field(name, FILER, "filer code")?.to_string(),
            additional_number: number(name, ADDITIONAL, "additional number")?,
            period_end_date: date(name, PERIOD_END, "period end date")?,
            submission_sequence: number(name, SUBMISSION_SEQUENCE, "submission sequence")?,
            submission_date: date(name, SUBMISSION_DATE, "submission date")?,
        })
    }

    /// Namespace prefix of the filer-specific extension taxonomy,
    /// e.g. `jpcrp030000-asr_X99999-000`.
    pub fn document_namespace_prefix(&self) -> String {
        format!(
            "jp{}{}-{}_{}-{:03}",
            self.cabinet_order_code,
            self.style_code,
            self.report_code,
            self.filer_code,
            self.additional_number
        )
    }
}

impl FromStr for FilenameMetadata {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn filename_error(name: &str, reason: impl Into<String>) -> DataError {
    DataError::Filename {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn field<'a>(name: &'a str, range: Range<usize>, what: &str) -> Result<&'a str> {
    name.get(range.clone())
        .ok_or_else(|| filename_error(name, format!("{what} missing at {range:?}")))
}

fn number<T: FromStr>(name: &str, range: Range<usize>, what: &str) -> Result<T> {
    let raw = field(name, range, what)?;
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(filename_error(name, format!("{what} is not numeric ({raw})")));
    }
    raw.parse()
        .map_err(|_| filename_error(name, format!("{what} out of range ({raw})")))
}

fn date(name: &str, range: Range<usize>, what: &str) -> Result<NaiveDate> {
    let raw = field(name, range, what)?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| filename_error(name, format!("{what} is not an ISO date ({raw}): {e}")))
}
