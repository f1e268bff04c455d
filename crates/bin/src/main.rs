//! EDINET CLI binary.
//!
//! Fetches disclosure documents into a local store, parses stored annual
//! securities reports and watches for new large shareholding reports.

mod integration;

use chrono::{Local, NaiveDate};
use clap::{ArgAction, Parser, Subcommand};
use edinet_data::api::EDINET_BASE_URL;
use edinet_data::xbrl::parse_archive;
use edinet_data::{
    ClientConfig, DocType, DocumentStore, DownloadFilter, DownloadSummary, Downloader,
    EdinetClient, RetryPolicy,
};
use edinet_output::{ExportError, ExportFormat, Exporter, ResultTable, write_facts_csv};
use edinet_parse::{
    BasicFinancialsMapper, DebugOutput, HoldingReport, HoldingsChecker, ParallelParser,
    SecuritiesReportParser, result_table,
};
use indicatif::{ProgressBar, ProgressStyle};
use integration::history_manager::open_history;
use integration::sec_codes::{load_sec_codes, parse_sec_code_list};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "edinet")]
#[command(about = "EDINET disclosure fetcher and XBRL fact extractor", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// EDINET API subscription key
    #[arg(long, env = "EDINET_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// API base URL
    #[arg(long, default_value = EDINET_BASE_URL, global = true)]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download document lists and documents for a period
    Fetch {
        /// First day (YYYY-MM-DD)
        #[arg(long = "from")]
        start: NaiveDate,

        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long = "to")]
        end: NaiveDate,

        /// Directory to store data
        #[arg(long)]
        dir: PathBuf,

        /// Fetch every rendition (XBRL, PDF, attachments, English)
        #[arg(long)]
        full: bool,

        /// Only fetch documents with these document type codes
        #[arg(long = "doc-code", value_name = "NNN", num_args = 1..)]
        doc_codes: Option<Vec<String>>,

        /// Skip documents without a security code
        #[arg(long)]
        need_sec_code: bool,

        /// Seconds to wait before retrying a failed request (0 disables retries)
        #[arg(long, default_value = "60")]
        retry_interval: u64,
    },

    /// Parse stored securities reports into a table
    Parse {
        /// Directory the documents were fetched into
        #[arg(long)]
        dir: PathBuf,

        /// First day (YYYY-MM-DD)
        #[arg(long = "from")]
        start: NaiveDate,

        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long = "to")]
        end: NaiveDate,

        /// Output file (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Output format: csv, json or pretty-json (default from the output extension)
        #[arg(long)]
        format: Option<ExportFormat>,

        /// Number of documents parsed at once (default: available cores)
        #[arg(long)]
        workers: Option<usize>,

        /// Dump each document's facts as CSV into this directory
        #[arg(long)]
        debug_csv_dir: Option<PathBuf>,

        /// Copy each document's PDF into this directory
        #[arg(long)]
        debug_pdf_dir: Option<PathBuf>,

        /// Only parse these security codes (comma separated)
        #[arg(long)]
        sec_codes: Option<String>,
    },

    /// Check for new large shareholding reports (exit code 1 if any)
    Check {
        /// Days to look back
        #[arg(long, default_value = "1")]
        days: u32,

        /// CSV file with a `sec_code` column of issuers to watch
        #[arg(long)]
        codes_file: Option<PathBuf>,

        /// History database (default: platform cache directory)
        #[arg(long)]
        history_file: Option<PathBuf>,

        /// Do not read or update the history
        #[arg(long)]
        no_history: bool,

        /// Seconds to wait before retrying a failed request (0 disables retries)
        #[arg(long, default_value = "0")]
        retry_interval: u64,

        /// Output format of the reports found: csv, json or pretty-json
        #[arg(long, default_value = "pretty-json")]
        format: ExportFormat,
    },

    /// Dump every fact of one XBRL archive as CSV
    Dump {
        /// Archive (`{doc_id}_1.zip`)
        archive: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

async fn run() -> Result<i32, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let client_config = |retry_interval: u64| {
        let retry = if retry_interval == 0 {
            RetryPolicy::disabled()
        } else {
            RetryPolicy::every(Duration::from_secs(retry_interval))
        };
        ClientConfig::default()
            .with_base_url(cli.base_url.clone())
            .with_api_key(cli.api_key.clone())
            .with_retry(retry)
    };

    match cli.command {
        Commands::Fetch {
            start,
            end,
            ref dir,
            full,
            ref doc_codes,
            need_sec_code,
            retry_interval,
        } => {
            let filter = DownloadFilter::default()
                .with_doc_types(if full {
                    DocType::ALL.to_vec()
                } else {
                    vec![DocType::Main]
                })
                .with_doc_type_codes(doc_codes.clone())
                .with_require_sec_code(need_sec_code);
            let client = EdinetClient::with_config(client_config(retry_interval))?;
            fetch_period(client, DocumentStore::new(dir), filter, start, end).await?;
            Ok(0)
        }
        Commands::Parse {
            ref dir,
            start,
            end,
            ref output,
            format,
            workers,
            ref debug_csv_dir,
            ref debug_pdf_dir,
            ref sec_codes,
        } => {
            let parser = SecuritiesReportParser::new(BasicFinancialsMapper)
                .with_debug(
                    DebugOutput::default()
                        .with_csv_dir(debug_csv_dir.clone())
                        .with_pdf_dir(debug_pdf_dir.clone()),
                )
                .with_sec_codes(sec_codes.as_deref().map(parse_sec_code_list));
            let mut parser = ParallelParser::new(parser);
            if let Some(workers) = workers {
                parser = parser.with_workers(workers);
            }
            let format = format
                .or_else(|| output.as_deref().and_then(ExportFormat::from_path))
                .unwrap_or_default();
            parse_period(&parser, dir, start, end, output.as_deref(), format).await?;
            Ok(0)
        }
        Commands::Check {
            days,
            ref codes_file,
            ref history_file,
            no_history,
            retry_interval,
            format,
        } => {
            let sec_codes = codes_file.as_deref().map(load_sec_codes).transpose()?;
            let history = if no_history {
                None
            } else {
                Some(open_history(history_file.as_deref())?)
            };
            let client = EdinetClient::with_config(client_config(retry_interval))?;
            let checker = HoldingsChecker::new(client)
                .with_history(history)
                .with_sec_codes(sec_codes);

            let found = checker.check(Local::now().naive_local(), days).await?;
            if found.is_empty() {
                Ok(0)
            } else {
                println!("{}", render_reports(&found, format)?);
                Ok(1)
            }
        }
        Commands::Dump {
            ref archive,
            ref output,
        } => {
            let facts = parse_archive(archive)?;
            match output {
                Some(path) => {
                    write_facts_csv(&facts, path)?;
                    info!("{} facts written to {}", facts.len(), path.display());
                }
                None => print!("{}", facts.export_to_string(ExportFormat::Csv)?),
            }
            Ok(0)
        }
    }
}

/// Log to stderr; `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn fetch_period(
    client: EdinetClient,
    store: DocumentStore,
    filter: DownloadFilter,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(), Box<dyn std::error::Error>> {
    let downloader = Downloader::new(client, store).with_filter(filter);
    let days: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();

    let pb = ProgressBar::new(days.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut total = DownloadSummary::default();
    for date in days {
        pb.set_message(format!("{date}"));
        match downloader.save_docs_for_day(date).await {
            Ok(Some(summary)) => {
                total.days += summary.days;
                total.documents += summary.documents;
                total.files += summary.files;
            }
            Ok(None) => total.skipped_days += 1,
            Err(e) => {
                pb.finish_with_message("Failed!");
                return Err(e.into());
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message(format!(
        "{} days ({} skipped), {} documents, {} files",
        total.days, total.skipped_days, total.documents, total.files
    ));
    Ok(())
}

async fn parse_period(
    parser: &ParallelParser<SecuritiesReportParser<BasicFinancialsMapper>>,
    dir: &Path,
    start: NaiveDate,
    end: NaiveDate,
    output: Option<&Path>,
    format: ExportFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = DocumentStore::new(dir);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {elapsed} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("Parsing {start} .. {end}"));

    let results = parser.parse_period(&store, start, end).await?;
    let failed = results.iter().filter(|r| r.record.is_none()).count();
    pb.finish_with_message(format!("{} documents, {failed} failed", results.len()));
    if failed > 0 {
        warn!("{failed} documents could not be parsed");
    }

    let table = result_table(&results)?;
    match output {
        Some(path) => {
            table.export_to_file(path, format)?;
            info!("{} rows written to {}", table.len(), path.display());
        }
        None => print!("{}", table.export_to_string(format)?),
    }
    Ok(())
}

/// One row per report, holding fields flattened next to the document id.
fn render_reports(found: &[HoldingReport], format: ExportFormat) -> Result<String, ExportError> {
    ResultTable::from_records(found)?.export_to_string(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use edinet_parse::LargeHolding;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch_args() {
        let cli = Cli::try_parse_from([
            "edinet", "fetch", "--from", "2024-06-01", "--to", "2024-06-30", "--dir", "data",
            "--doc-code", "120", "140", "--need-sec-code",
        ])
        .unwrap();
        match cli.command {
            Commands::Fetch {
                start,
                end,
                doc_codes,
                need_sec_code,
                full,
                retry_interval,
                ..
            } => {
                assert_eq!(start, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
                assert_eq!(end, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
                assert_eq!(doc_codes, Some(vec!["120".to_string(), "140".to_string()]));
                assert!(need_sec_code);
                assert!(!full);
                assert_eq!(retry_interval, 60);
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_parse_format_arg() {
        let cli = Cli::try_parse_from([
            "edinet", "-v", "parse", "--dir", "data", "--from", "2024-06-01", "--to",
            "2024-06-30", "--format", "pretty-json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Parse { format, .. } => assert_eq!(format, Some(ExportFormat::PrettyJson)),
            _ => panic!("expected parse"),
        }
    }

    #[test]
    fn test_check_format_arg() {
        let cli = Cli::try_parse_from(["edinet", "check", "--days", "3"]).unwrap();
        match cli.command {
            Commands::Check { days, format, .. } => {
                assert_eq!(days, 3);
                assert_eq!(format, ExportFormat::PrettyJson);
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn test_render_reports() {
        let report = HoldingReport {
            doc_id: "S100LVH1".to_string(),
            submitted_at: NaiveDate::from_ymd_opt(2024, 6, 20)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            holding: LargeHolding {
                issuer_sec_code: Some("7203".to_string()),
                filer_name: Some("Holder Inc.".to_string()),
                ..Default::default()
            },
        };

        let csv = render_reports(std::slice::from_ref(&report), ExportFormat::Csv).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert!(lines[0].starts_with("doc_id,submitted_at,issuer_sec_code,"));
        assert!(lines[1].starts_with("S100LVH1,2024-06-20T09:30:00,7203,"));
        assert!(lines[1].ends_with(",Holder Inc."));

        let json = render_reports(&[report], ExportFormat::Json).unwrap();
        let rows: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(rows[0]["issuer_sec_code"], "7203");
        assert_eq!(rows[0]["reason"], serde_json::Value::Null);
    }
}
