//! Integration tests: download into a store, then parse the stored archive

use chrono::NaiveDate;
use edinet_data::api::{RawResponse, Sleeper, Transport};
use edinet_data::xbrl::{Period, open_archive, parse_archive};
use edinet_data::{
    ClientConfig, DataError, DocType, DocumentStore, DownloadFilter, Downloader, EdinetClient,
    HistoryStore, new_documents,
};
use std::collections::HashMap;
use std::future::Future;
use std::io::{Cursor, Write};
use std::sync::Mutex;
use std::time::Duration;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const INSTANCE: &str = "XBRL/PublicDoc/jpcrp030000-asr-001_E02144-000_2024-03-31_01_2024-06-18.xbrl";

const XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xbrli:xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance"
    xmlns:jpdei_cor="http://disclosure.edinet-fsa.go.jp/taxonomy/jpdei/2013-08-31/jpdei_cor"
    xmlns:jpcrp_cor="http://disclosure.edinet-fsa.go.jp/taxonomy/jpcrp/2023-12-01/jpcrp_cor"
    xmlns:jppfs_cor="http://disclosure.edinet-fsa.go.jp/taxonomy/jppfs/2023-12-01/jppfs_cor">
  <xbrli:context id="FilingDateInstant">
    <xbrli:entity><xbrli:identifier scheme="http://disclosure.edinet-fsa.go.jp">E02144-000</xbrli:identifier></xbrli:entity>
    <xbrli:period><xbrli:instant>2024-06-18</xbrli:instant></xbrli:period>
  </xbrli:context>
  <xbrli:context id="CurrentYearInstant">
    <xbrli:entity><xbrli:identifier scheme="http://disclosure.edinet-fsa.go.jp">E02144-000</xbrli:identifier></xbrli:entity>
    <xbrli:period><xbrli:instant>2024-03-31</xbrli:instant></xbrli:period>
  </xbrli:context>
  <xbrli:context id="Prior1YearInstant">
    <xbrli:entity><xbrli:identifier scheme="http://disclosure.edinet-fsa.go.jp">E02144-000</xbrli:identifier></xbrli:entity>
    <xbrli:period><xbrli:instant>2023-03-31</xbrli:instant></xbrli:period>
  </xbrli:context>
  <xbrli:context id="CurrentYearDuration">
    <xbrli:entity><xbrli:identifier scheme="http://disclosure.edinet-fsa.go.jp">E02144-000</xbrli:identifier></xbrli:entity>
    <xbrli:period><xbrli:startDate>2023-04-01</xbrli:startDate><xbrli:endDate>2024-03-31</xbrli:endDate></xbrli:period>
  </xbrli:context>
  <jpdei_cor:SecurityCodeDEI contextRef="FilingDateInstant">72030</jpdei_cor:SecurityCodeDEI>
  <jpcrp_cor:NumberOfEmployees contextRef="CurrentYearInstant" unitRef="pure" decimals="0">380793</jpcrp_cor:NumberOfEmployees>
  <jppfs_cor:Assets contextRef="Prior1YearInstant" unitRef="JPY" decimals="-6">74303180000000</jppfs_cor:Assets>
  <jppfs_cor:Assets contextRef="CurrentYearInstant" unitRef="JPY" decimals="-6">90114296000000</jppfs_cor:Assets>
  <jppfs_cor:NetSales contextRef="CurrentYearDuration" unitRef="JPY" decimals="-6">45095325000000</jppfs_cor:NetSales>
  <jppfs_cor:NetSales contextRef="CurrentYearDuration" unitRef="JPY" decimals="-6">45095325000000</jppfs_cor:NetSales>
</xbrli:xbrl>
"#;

fn archive() -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("XBRL/PublicDoc/0000000_header_jpcrp030000-asr-001.htm", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"<html/>").unwrap();
    writer.start_file(INSTANCE, SimpleFileOptions::default()).unwrap();
    writer.write_all(XML.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

/// Serves canned responses keyed by path and `type` query value.
#[derive(Debug, Default)]
struct RegistryStub {
    responses: HashMap<(String, String), RawResponse>,
    hits: Mutex<Vec<String>>,
}

impl RegistryStub {
    fn serve(mut self, path: &str, kind: &str, response: RawResponse) -> Self {
        self.responses
            .insert((path.to_string(), kind.to_string()), response);
        self
    }
}

impl Transport for RegistryStub {
    fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> impl Future<Output = edinet_data::Result<RawResponse>> + Send {
        let path = url.trim_start_matches("https://registry.test").to_string();
        let kind = query
            .iter()
            .find(|(k, _)| *k == "type")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        self.hits.lock().unwrap().push(format!("{path}?type={kind}"));
        let response = self
            .responses
            .get(&(path, kind))
            .cloned()
            .unwrap_or_else(|| {
                RawResponse::new(
                    404,
                    Some("application/json; charset=utf-8"),
                    r#"{"metadata": {"status": "404", "message": "Not Found"}}"#,
                )
            });
        std::future::ready(Ok(response))
    }
}

#[derive(Debug, Clone, Copy)]
struct NoSleep;

impl Sleeper for NoSleep {
    fn sleep(&self, _duration: Duration) -> impl Future<Output = ()> + Send {
        std::future::ready(())
    }
}

fn list_json() -> &'static str {
    r#"{
        "metadata": {
            "title": "提出された書類を把握するためのAPI",
            "resultset": {"count": 2},
            "processDateTime": "2024-06-19 00:00",
            "status": "200",
            "message": "OK"
        },
        "results": [
            {"seqNumber": 1, "docID": "S100TOYO", "edinetCode": "E02144", "secCode": "72030",
             "filerName": "トヨタ自動車株式会社", "ordinanceCode": "010", "formCode": "030000",
             "docTypeCode": "120", "periodStart": "2023-04-01", "periodEnd": "2024-03-31",
             "submitDateTime": "2024-06-18 15:00", "pdfFlag": "1"},
            {"seqNumber": 2, "docID": "S100FUND", "docTypeCode": "030", "secCode": null,
             "submitDateTime": "2024-06-18 15:05"}
        ]
    }"#
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 18).unwrap()
}

#[tokio::test]
async fn test_download_then_parse() {
    let stub = RegistryStub::default()
        .serve(
            "/documents.json",
            "2",
            RawResponse::new(200, Some("application/json; charset=utf-8"), list_json()),
        )
        .serve(
            "/documents/S100TOYO",
            "1",
            RawResponse::new(200, Some("application/octet-stream"), archive()),
        );
    let config = ClientConfig::default()
        .with_base_url("https://registry.test")
        .with_request_delay(Duration::ZERO);
    let client = EdinetClient::with_parts(config, stub, NoSleep);

    let dir = tempfile::tempdir().unwrap();
    let downloader = Downloader::new(client, DocumentStore::new(dir.path())).with_filter(
        DownloadFilter::default()
            .with_doc_types(vec![DocType::Main, DocType::Pdf])
            .with_require_sec_code(true),
    );

    let summary = downloader
        .save_docs_for_period(date(), date())
        .await
        .unwrap();
    assert_eq!(summary.days, 1);
    assert_eq!(summary.documents, 1);
    assert_eq!(summary.files, 1);

    let store = downloader.store();
    assert_eq!(
        std::fs::read_to_string(store.list_path(date())).unwrap(),
        list_json()
    );
    let list = store.load_list(date()).unwrap().unwrap();
    assert_eq!(list.result_count(), 2);
    assert_eq!(list.results[0].filer_name.as_deref(), Some("トヨタ自動車株式会社"));

    let path = store.document_path(date(), "S100TOYO", DocType::Main);
    let facts = parse_archive(&path).unwrap();
    // the repeated NetSales element collapses into one fact
    assert_eq!(facts.len(), 5);
    assert_eq!(
        facts
            .get_int(Some("jppfs_cor"), "NetSales", Some("CurrentYearDuration"))
            .unwrap(),
        Some(45_095_325_000_000)
    );
    assert_eq!(
        facts.get_text(Some("jpdei_cor"), "SecurityCodeDEI", None).unwrap().as_deref(),
        Some("72030")
    );

    let instance = open_archive(&path).unwrap();
    assert_eq!(instance.filename.filer_code, "E02144");
    assert_eq!(
        instance.contexts["CurrentYearInstant"].period,
        Period::Instant(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap())
    );
}

#[test]
fn test_ambiguous_lookup_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("S100TOYO_1.zip");
    std::fs::write(&path, archive()).unwrap();
    let facts = parse_archive(&path).unwrap();

    let err = facts.lookup(Some("jppfs_cor"), "Assets", None).unwrap_err();
    assert!(matches!(err, DataError::AmbiguousLookup { count: 2, .. }));
    assert_eq!(
        facts
            .get_int(Some("jppfs_cor"), "Assets", Some("Prior1YearInstant"))
            .unwrap(),
        Some(74_303_180_000_000)
    );
    assert!(facts.lookup(Some("jp"), "NetSales", None).unwrap().is_some());
}

#[test]
fn test_resume_from_history() {
    let list: edinet_data::DocumentList = serde_json::from_str(list_json()).unwrap();
    let history = HistoryStore::in_memory().unwrap();

    assert_eq!(new_documents(&list, history.get_count(date()).unwrap()).len(), 2);
    history.put_count(date(), list.result_count()).unwrap();
    assert!(new_documents(&list, history.get_count(date()).unwrap()).is_empty());
}
