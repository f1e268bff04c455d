//! Parallel parsing of stored documents.

use crate::error::{ParseError, Result};
use crate::parser::{DocumentParser, DocumentTarget};
use chrono::NaiveDate;
use edinet_data::DocumentStore;
use edinet_output::{ExportError, ResultTable};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Span, error, info, info_span, warn};

/// Outcome of parsing one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedDocument<T, R> {
    /// The document
    pub target: T,
    /// Extracted record, `None` if parsing failed
    pub record: Option<R>,
}

impl<T: Serialize, R: Serialize> ParsedDocument<T, R> {
    /// Add this document as one row of `table`.
    pub fn push_into(&self, table: &mut ResultTable) -> std::result::Result<(), ExportError> {
        table.push(&self.target, self.record.as_ref())
    }
}

/// Collect parse results into an exportable table.
pub fn result_table<T: Serialize, R: Serialize>(
    docs: &[ParsedDocument<T, R>],
) -> std::result::Result<ResultTable, ExportError> {
    let mut table = ResultTable::new();
    for doc in docs {
        doc.push_into(&mut table)?;
    }
    Ok(table)
}

/// Runs a [`DocumentParser`] over many documents on blocking workers.
#[derive(Debug)]
pub struct ParallelParser<P> {
    parser: Arc<P>,
    workers: usize,
    span: Span,
}

impl<P: DocumentParser> ParallelParser<P> {
    /// Create an orchestrator with one worker per available core.
    pub fn new(parser: P) -> Self {
        let workers = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
        Self {
            parser: Arc::new(parser),
            workers,
            span: info_span!("parallel_parser"),
        }
    }

    /// Limit the number of documents parsed at once.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Log inside the given span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The wrapped parser.
    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Number of workers.
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Parse each `(target, directory)` pair.
    ///
    /// Results keep the input order. A document whose parse fails, or
    /// whose worker panics, is logged and gets `record: None`.
    pub async fn parse_batch(
        &self,
        items: Vec<(P::Target, PathBuf)>,
    ) -> Vec<ParsedDocument<P::Target, P::Record>> {
        let total = items.len();
        self.span
            .in_scope(|| info!("parsing {total} documents with {} workers", self.workers));

        stream::iter(items)
            .map(|(target, dir)| {
                let parser = Arc::clone(&self.parser);
                let span = self.span.clone();
                async move {
                    let doc_id = target.doc_id().to_string();
                    let joined =
                        tokio::task::spawn_blocking(move || span.in_scope(|| parser.parse_dir(&dir)))
                            .await;
                    let result = joined.unwrap_or_else(|e| {
                        Err(ParseError::Worker {
                            doc_id: doc_id.clone(),
                            reason: e.to_string(),
                        })
                    });
                    let record = match result {
                        Ok(record) => Some(record),
                        Err(e) => {
                            self.span.in_scope(|| error!("failed to parse {doc_id}: {e}"));
                            None
                        }
                    };
                    ParsedDocument { target, record }
                }
            })
            .buffered(self.workers)
            .collect()
            .await
    }

    /// Parse every stored document selected by the parser between `start`
    /// and `end` (inclusive).
    ///
    /// Days without a stored list and selected documents without a
    /// directory are logged and passed over.
    ///
    /// # Errors
    /// Fails when a stored list cannot be read.
    pub async fn parse_period(
        &self,
        store: &DocumentStore,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ParsedDocument<P::Target, P::Record>>> {
        let mut items = Vec::new();
        for date in start.iter_days().take_while(|d| *d <= end) {
            let Some(list) = store.load_list(date)? else {
                self.span
                    .in_scope(|| warn!("{} not found, skip", store.list_path(date).display()));
                continue;
            };
            for target in self.parser.select_targets(&list) {
                let dir = store.doc_dir(date, target.doc_id());
                if !dir.is_dir() {
                    self.span.in_scope(|| {
                        warn!("{} not found, skip", dir.display());
                    });
                    continue;
                }
                items.push((target, dir));
            }
        }
        Ok(self.parse_batch(items).await)
    }
}
