//! Watching the registry for new large shareholding reports.

use crate::error::{ParseError, Result};
use crate::holdings::{LargeHolding, LargeHoldingMapper};
use crate::parser::{FactMapper, sec_code_matches};
use chrono::{Duration, NaiveDateTime};
use edinet_data::api::{FetchedList, HttpTransport, ListDetail, Sleeper, TokioSleeper, Transport};
use edinet_data::xbrl::read_archive_bytes;
use edinet_data::{DocType, DocumentSummary, EdinetClient, HistoryStore, new_documents};
use serde::Serialize;
use tracing::{Span, info, info_span, warn};

/// A report the checker found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoldingReport {
    /// Document id
    pub doc_id: String,
    /// Submission timestamp
    pub submitted_at: NaiveDateTime,
    /// Cover page fields
    #[serde(flatten)]
    pub holding: LargeHolding,
}

/// Fetches recent large shareholding reports and keeps those concerning
/// the watched issuers.
///
/// With a [`HistoryStore`], each day's processed result count is
/// remembered so that a later run only looks at newly listed documents.
pub struct HoldingsChecker<T = HttpTransport, S = TokioSleeper> {
    client: EdinetClient<T, S>,
    mapper: LargeHoldingMapper,
    history: Option<HistoryStore>,
    sec_codes: Option<Vec<String>>,
    span: Span,
}

impl<T: Transport, S: Sleeper> HoldingsChecker<T, S> {
    /// Create a checker without history.
    pub fn new(client: EdinetClient<T, S>) -> Self {
        Self {
            client,
            mapper: LargeHoldingMapper,
            history: None,
            sec_codes: None,
            span: info_span!("holdings_checker"),
        }
    }

    /// Remember processed counts in `history`.
    pub fn with_history(mut self, history: Option<HistoryStore>) -> Self {
        self.history = history;
        self
    }

    /// Only report issuers with one of these security codes.
    pub fn with_sec_codes(mut self, sec_codes: Option<Vec<String>>) -> Self {
        self.sec_codes = sec_codes;
        self
    }

    /// Log inside the given span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The history store, if any.
    pub const fn history(&self) -> Option<&HistoryStore> {
        self.history.as_ref()
    }

    /// Check documents submitted in the `days` days before `now`.
    ///
    /// # Errors
    /// Fails on network or history errors. Documents that cannot be parsed
    /// are logged and passed over.
    pub async fn check(&self, now: NaiveDateTime, days: u32) -> Result<Vec<HoldingReport>> {
        let since = now - Duration::days(i64::from(days));
        let mut found = Vec::new();

        for date in since.date().iter_days().take_while(|d| *d <= now.date()) {
            let Some(FetchedList { list, .. }) = self
                .client
                .fetch_document_list(date, ListDetail::Full)
                .await?
            else {
                self.span.in_scope(|| warn!("no document list for {date} yet"));
                continue;
            };

            let stored = match &self.history {
                Some(history) => history.get_count(date)?,
                None => None,
            };
            let docs = new_documents(&list, stored);
            if docs.is_empty() && stored.is_some() {
                self.span.in_scope(|| info!("No updates in {date}"));
            }

            for doc in docs {
                let Some(submitted_at) = doc.submitted_at() else {
                    self.span.in_scope(|| {
                        warn!("'submitDateTime' is missing ({}). Skip...", doc.doc_id);
                    });
                    continue;
                };
                if submitted_at < since {
                    continue;
                }
                if let Some(report) = self.check_one(doc, submitted_at).await? {
                    found.push(report);
                }
            }

            if let Some(history) = &self.history {
                history.put_count(date, list.result_count())?;
            }
        }
        Ok(found)
    }

    async fn check_one(
        &self,
        doc: &DocumentSummary,
        submitted_at: NaiveDateTime,
    ) -> Result<Option<HoldingReport>> {
        if !LargeHoldingMapper::selects(doc) {
            return Ok(None);
        }
        let Some(bytes) = self.client.fetch_document(&doc.doc_id, DocType::Main).await? else {
            return Ok(None);
        };

        let holding = match read_archive_bytes(&bytes)
            .map_err(ParseError::from)
            .and_then(|instance| self.mapper.map(&instance.facts))
        {
            Ok(holding) => holding,
            Err(e) if e.is_document_error() => {
                self.span
                    .in_scope(|| warn!("failed to parse {}: {e}", doc.doc_id));
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if let Some(codes) = &self.sec_codes {
            let issuer = holding.issuer_sec_code.as_deref().unwrap_or_default();
            if !codes.iter().any(|c| sec_code_matches(issuer, c)) {
                return Ok(None);
            }
        }
        if holding.is_address_change() {
            return Ok(None);
        }

        let report = HoldingReport {
            doc_id: doc.doc_id.clone(),
            submitted_at,
            holding,
        };
        self.span.in_scope(|| info!("Found: {report:?}"));
        Ok(Some(report))
    }
}

impl<T, S> std::fmt::Debug for HoldingsChecker<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoldingsChecker")
            .field("client", &self.client)
            .field("sec_codes", &self.sec_codes)
            .finish_non_exhaustive()
    }
}
