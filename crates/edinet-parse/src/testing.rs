//! Fixtures shared by unit tests.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub(crate) const SEC_REPORT_INSTANCE: &str =
    "XBRL/PublicDoc/jpcrp030000-asr-001_E00001-000_2024-03-31_01_2024-06-20.xbrl";

pub(crate) const HOLDING_INSTANCE: &str =
    "XBRL/PublicDoc/jplvh010000-lvh-001_E11111-000_2024-06-10_01_2024-06-17.xbrl";

const CONTEXTS: &str = r#"
  <xbrli:context id="FilingDateInstant"><xbrli:period><xbrli:instant>2024-06-20</xbrli:instant></xbrli:period></xbrli:context>
  <xbrli:context id="CurrentYearInstant"><xbrli:period><xbrli:instant>2024-03-31</xbrli:instant></xbrli:period></xbrli:context>
  <xbrli:context id="CurrentYearInstant_NonConsolidatedMember"><xbrli:period><xbrli:instant>2024-03-31</xbrli:instant></xbrli:period></xbrli:context>
  <xbrli:context id="CurrentYearDuration"><xbrli:period><xbrli:startDate>2023-04-01</xbrli:startDate><xbrli:endDate>2024-03-31</xbrli:endDate></xbrli:period></xbrli:context>
  <xbrli:context id="CurrentYearDuration_NonConsolidatedMember"><xbrli:period><xbrli:startDate>2023-04-01</xbrli:startDate><xbrli:endDate>2024-03-31</xbrli:endDate></xbrli:period></xbrli:context>
"#;

/// Instance declaring the usual namespaces, with `(qualified tag, context,
/// text)` facts.
pub(crate) fn instance_xml(facts: &[(&str, &str, &str)]) -> String {
    let mut body = String::new();
    for (tag, context, text) in facts {
        body.push_str(&format!(
            "  <{tag} contextRef=\"{context}\" unitRef=\"JPY\">{text}</{tag}>\n"
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<xbrli:xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance"
    xmlns:jpdei_cor="http://disclosure.edinet-fsa.go.jp/taxonomy/jpdei/2013-08-31/jpdei_cor"
    xmlns:jpcrp_cor="http://disclosure.edinet-fsa.go.jp/taxonomy/jpcrp/2023-12-01/jpcrp_cor"
    xmlns:jplvh_cor="http://disclosure.edinet-fsa.go.jp/taxonomy/jplvh/2023-12-01/jplvh_cor"
    xmlns:jppfs_cor="http://disclosure.edinet-fsa.go.jp/taxonomy/jppfs/2023-12-01/jppfs_cor">{CONTEXTS}{body}</xbrli:xbrl>
"#
    )
}

/// Zip holding one instance entry.
pub(crate) fn archive(entry: &str, xml: &str) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file(entry, SimpleFileOptions::default()).unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

/// Securities report archive with the given facts.
pub(crate) fn sec_report_archive(facts: &[(&str, &str, &str)]) -> Vec<u8> {
    archive(SEC_REPORT_INSTANCE, &instance_xml(facts))
}

/// Write `{doc_id}_1.zip` into `dir/{doc_id}/`.
pub(crate) fn write_main_archive(dir: &Path, doc_id: &str, bytes: &[u8]) -> PathBuf {
    let doc_dir = dir.join(doc_id);
    std::fs::create_dir_all(&doc_dir).unwrap();
    std::fs::write(doc_dir.join(format!("{doc_id}_1.zip")), bytes).unwrap();
    doc_dir
}
