//! Example fetching one day's document list and reading facts from the
//! first securities report on it.
//!
//! This example shows how to:
//! 1. Fetch a document list for a day
//! 2. Download the XBRL archive of a report
//! 3. Look up facts by namespace, tag and context
//!
//! Run with:
//! ```bash
//! EDINET_API_KEY=... cargo run --example edinet_xbrl_example -- 2024-06-20
//! ```

use chrono::NaiveDate;
use edinet_data::api::{FetchedList, ListDetail};
use edinet_data::xbrl::read_archive_bytes;
use edinet_data::{ClientConfig, DocType, EdinetClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let date: NaiveDate = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "2024-06-20".to_string())
        .parse()?;

    let config = ClientConfig::default().with_api_key(std::env::var("EDINET_API_KEY").ok());
    let client = EdinetClient::with_config(config)?;

    println!("=== EDINET XBRL Example ({date}) ===\n");
    let Some(FetchedList { list, .. }) = client.fetch_document_list(date, ListDetail::Full).await?
    else {
        println!("No document list for {date}");
        return Ok(());
    };
    println!("{} documents listed", list.result_count());

    let Some(report) = list
        .results
        .iter()
        .find(|d| d.doc_type_code.as_deref() == Some("120") && d.sec_code.is_some())
    else {
        println!("No securities report submitted on {date}");
        return Ok(());
    };
    println!(
        "Report: {} ({})",
        report.filer_name.as_deref().unwrap_or("?"),
        report.doc_id
    );

    let Some(bytes) = client.fetch_document(&report.doc_id, DocType::Main).await? else {
        println!("Archive not available");
        return Ok(());
    };
    let instance = read_archive_bytes(&bytes)?;
    println!(
        "Filer {} / period end {} / submitted {}",
        instance.filename.filer_code,
        instance.filename.period_end_date,
        instance.filename.submission_date
    );
    println!("Total facts loaded: {}\n", instance.facts.len());

    for tag in ["NetSales", "OperatingIncome", "Assets"] {
        let context = if tag == "Assets" {
            "CurrentYearInstant"
        } else {
            "CurrentYearDuration"
        };
        match instance.facts.get_int(Some("jppfs_cor"), tag, Some(context)) {
            Ok(Some(value)) => println!("  {tag:<16} {value:>20}"),
            Ok(None) => println!("  {tag:<16} {:>20}", "-"),
            Err(e) => println!("  {tag:<16} {e}"),
        }
    }
    Ok(())
}
