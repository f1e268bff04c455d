//! Annual securities reports (有価証券報告書).

use crate::error::Result;
use crate::parser::{DocumentParser, DocumentTarget, FactMapper, sec_code_matches};
use chrono::NaiveDate;
use edinet_data::store::find_rendition;
use edinet_data::xbrl::open_archive;
use edinet_data::{DataError, DocType, DocumentList};
use edinet_output::write_facts_csv;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Span, debug, info, info_span, warn};

/// Document type code of a securities report
pub const SECURITIES_REPORT_CODE: &str = "120";

const ORDINANCE_CODE: &str = "010";
const FORM_CODE: &str = "030000";

/// Where to leave intermediate artifacts of a parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugOutput {
    /// Directory receiving one fact CSV per document
    pub csv_dir: Option<PathBuf>,
    /// Directory receiving a copy of each document's PDF
    pub pdf_dir: Option<PathBuf>,
}

impl DebugOutput {
    /// Dump fact tables into `dir`.
    pub fn with_csv_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.csv_dir = dir;
        self
    }

    /// Copy PDFs into `dir`.
    pub fn with_pdf_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.pdf_dir = dir;
        self
    }
}

/// A securities report picked from a day's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuritiesReportTarget {
    /// Document id
    pub doc_id: String,
    /// Security code of the filer
    pub sec_code: String,
    /// Filer name
    pub name: Option<String>,
    /// First day of the reported fiscal year
    pub start_date: Option<String>,
    /// Last day of the reported fiscal year
    pub end_date: Option<String>,
    /// Submission date
    pub submit_date: Option<NaiveDate>,
}

impl DocumentTarget for SecuritiesReportTarget {
    fn doc_id(&self) -> &str {
        &self.doc_id
    }
}

/// Parses stored securities reports with a [`FactMapper`].
#[derive(Debug)]
pub struct SecuritiesReportParser<M> {
    mapper: M,
    debug: DebugOutput,
    sec_codes: Option<Vec<String>>,
    span: Span,
}

impl<M: FactMapper> SecuritiesReportParser<M> {
    /// Create a parser.
    pub fn new(mapper: M) -> Self {
        Self {
            mapper,
            debug: DebugOutput::default(),
            sec_codes: None,
            span: info_span!("securities_report"),
        }
    }

    /// Set debug output directories.
    pub fn with_debug(mut self, debug: DebugOutput) -> Self {
        self.debug = debug;
        self
    }

    /// Only select filers with one of these security codes.
    pub fn with_sec_codes(mut self, sec_codes: Option<Vec<String>>) -> Self {
        self.sec_codes = sec_codes;
        self
    }

    /// Log inside the given span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The mapper.
    pub const fn mapper(&self) -> &M {
        &self.mapper
    }

    fn wanted(&self, sec_code: &str) -> bool {
        self.sec_codes
            .as_ref()
            .is_none_or(|codes| codes.iter().any(|c| sec_code_matches(sec_code, c)))
    }

    fn dump_debug(&self, dir: &Path, facts: &edinet_data::FactTable) -> Result<()> {
        let dir_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if let Some(csv_dir) = &self.debug.csv_dir {
            fs::create_dir_all(csv_dir)?;
            let path = csv_dir.join(format!("{dir_name}.csv"));
            write_facts_csv(facts, &path)?;
            debug!("wrote {}", path.display());
        }

        if let Some(pdf_dir) = &self.debug.pdf_dir {
            match find_rendition(dir, DocType::Pdf)? {
                Some(pdf) => {
                    fs::create_dir_all(pdf_dir)?;
                    if let Some(name) = pdf.file_name() {
                        fs::copy(&pdf, pdf_dir.join(name))?;
                    }
                }
                None => debug!("no PDF in {}", dir.display()),
            }
        }
        Ok(())
    }
}

impl<M: FactMapper + 'static> DocumentParser for SecuritiesReportParser<M> {
    type Target = SecuritiesReportTarget;
    type Record = M::Record;

    fn select_targets(&self, list: &DocumentList) -> Vec<SecuritiesReportTarget> {
        self.span.in_scope(|| {
            list.results
                .iter()
                .filter(|doc| doc.doc_type_code.as_deref() == Some(SECURITIES_REPORT_CODE))
                .filter_map(|doc| {
                    let sec_code = doc.sec_code.as_deref()?;
                    let ordinance = doc.ordinance_code.as_deref().unwrap_or_default();
                    let form = doc.form_code.as_deref().unwrap_or_default();
                    if ordinance != ORDINANCE_CODE || form != FORM_CODE {
                        warn!(
                            "unsupported report (doc_id: {}, ordinance: {ordinance}, form: {form}), skip",
                            doc.doc_id
                        );
                        return None;
                    }
                    if !self.wanted(sec_code) {
                        return None;
                    }
                    Some(SecuritiesReportTarget {
                        doc_id: doc.doc_id.clone(),
                        sec_code: sec_code.to_string(),
                        name: doc.filer_name.clone(),
                        start_date: doc.period_start.clone(),
                        end_date: doc.period_end.clone(),
                        submit_date: doc.submit_date(),
                    })
                })
                .collect()
        })
    }

    fn parse_dir(&self, dir: &Path) -> Result<M::Record> {
        self.span.in_scope(|| {
            let archive = find_rendition(dir, DocType::Main)?.ok_or_else(|| {
                DataError::DocumentNotFound(format!("no XBRL archive in {}", dir.display()))
            })?;
            info!("parse {} ...", archive.display());

            let instance = open_archive(&archive)?;
            self.dump_debug(dir, &instance.facts)?;
            self.mapper.map(&instance.facts)
        })
    }
}
