//! Reading instances out of downloaded document archives.

use super::instance::{XbrlInstance, parse_instance};
use super::table::FactTable;
use crate::error::{DataError, Result};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// Directory of the primary instance inside a document archive
pub const PUBLIC_DOC_DIR: &str = "XBRL/PublicDoc/";

/// Name of the single `XBRL/PublicDoc/*.xbrl` entry.
///
/// # Errors
/// Returns [`DataError::ArchiveEntry`] when there is no such entry or more
/// than one.
pub fn locate_instance<R: Read + Seek>(archive: &ZipArchive<R>) -> Result<String> {
    let entries: Vec<&str> = archive
        .file_names()
        .filter(|name| name.starts_with(PUBLIC_DOC_DIR) && name.ends_with(".xbrl"))
        .collect();
    match entries.as_slice() {
        [entry] => Ok((*entry).to_string()),
        [] => Err(DataError::ArchiveEntry(format!(
            "no instance under {PUBLIC_DOC_DIR}"
        ))),
        many => Err(DataError::ArchiveEntry(format!(
            "{} instances under {PUBLIC_DOC_DIR}: {}",
            many.len(),
            many.join(", ")
        ))),
    }
}

/// Parse the primary instance of an archive.
pub fn read_archive<R: Read + Seek>(reader: R) -> Result<XbrlInstance> {
    let mut archive = ZipArchive::new(reader)?;
    let entry = locate_instance(&archive)?;
    let mut xml = Vec::new();
    archive.by_name(&entry)?.read_to_end(&mut xml)?;

    let file_name = entry.rsplit('/').next().unwrap_or(entry.as_str());
    debug!("Reading {entry} ({} bytes)", xml.len());
    parse_instance(file_name, &xml)
}

/// Parse an archive held in memory.
pub fn read_archive_bytes(bytes: &[u8]) -> Result<XbrlInstance> {
    read_archive(Cursor::new(bytes))
}

/// Parse the archive at `path`.
pub fn open_archive(path: impl AsRef<Path>) -> Result<XbrlInstance> {
    let file = File::open(path.as_ref())?;
    read_archive(BufReader::new(file))
}

/// Fact table of the archive at `path`.
pub fn parse_archive(path: impl AsRef<Path>) -> Result<FactTable> {
    Ok(open_archive(path)?.facts)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    /// Instance filename used by fixtures.
    pub(crate) const INSTANCE_NAME: &str =
        "jpcrp030000-asr-001_E00001-000_2023-03-31_01_2023-06-28.xbrl";

    /// Minimal securities report instance reporting the given `jppfs_cor` items
    /// for the current year.
    pub(crate) fn instance_xml(items: &[(&str, &str, i64)]) -> String {
        let mut body = String::new();
        for (tag, context, value) in items {
            body.push_str(&format!(
                "  <jppfs_cor:{tag} contextRef=\"{context}\" unitRef=\"JPY\" decimals=\"-6\">{value}</jppfs_cor:{tag}>\n"
            ));
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<xbrli:xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance"
    xmlns:jpdei_cor="http://disclosure.edinet-fsa.go.jp/taxonomy/jpdei/2013-08-31/jpdei_cor"
    xmlns:jppfs_cor="http://disclosure.edinet-fsa.go.jp/taxonomy/jppfs/2022-11-01/jppfs_cor">
  <xbrli:context id="FilingDateInstant"><xbrli:period><xbrli:instant>2023-06-28</xbrli:instant></xbrli:period></xbrli:context>
  <xbrli:context id="CurrentYearInstant"><xbrli:period><xbrli:instant>2023-03-31</xbrli:instant></xbrli:period></xbrli:context>
  <xbrli:context id="CurrentYearInstant_NonConsolidatedMember"><xbrli:period><xbrli:instant>2023-03-31</xbrli:instant></xbrli:period></xbrli:context>
  <xbrli:context id="CurrentYearDuration"><xbrli:period><xbrli:startDate>2022-04-01</xbrli:startDate><xbrli:endDate>2023-03-31</xbrli:endDate></xbrli:period></xbrli:context>
  <xbrli:context id="CurrentYearDuration_NonConsolidatedMember"><xbrli:period><xbrli:startDate>2022-04-01</xbrli:startDate><xbrli:endDate>2023-03-31</xbrli:endDate></xbrli:period></xbrli:context>
  <jpdei_cor:SecurityCodeDEI contextRef="FilingDateInstant">13010</jpdei_cor:SecurityCodeDEI>
{body}</xbrli:xbrl>
"#
        )
    }

    /// Zip the given `(entry name, content)` pairs.
    pub(crate) fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }
}
