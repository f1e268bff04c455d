//! Downloading documents into a [`DocumentStore`].

use crate::api::{
    DocType, DocumentSummary, EdinetClient, FetchedList, HttpTransport, ListDetail, Sleeper,
    TokioSleeper, Transport,
};
use crate::error::Result;
use crate::store::DocumentStore;
use chrono::NaiveDate;
use tracing::{Span, debug, info, info_span};

/// Which documents of a day are downloaded, and which renditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadFilter {
    /// Renditions to fetch for each selected document
    pub doc_types: Vec<DocType>,
    /// Accepted document type codes (`None` accepts all)
    pub doc_type_codes: Option<Vec<String>>,
    /// Skip documents without a security code
    pub require_sec_code: bool,
}

impl Default for DownloadFilter {
    fn default() -> Self {
        Self {
            doc_types: vec![DocType::Main],
            doc_type_codes: None,
            require_sec_code: false,
        }
    }
}

impl DownloadFilter {
    /// Set the renditions to fetch.
    pub fn with_doc_types(mut self, doc_types: Vec<DocType>) -> Self {
        self.doc_types = doc_types;
        self
    }

    /// Restrict to the given document type codes.
    pub fn with_doc_type_codes(mut self, codes: Option<Vec<String>>) -> Self {
        self.doc_type_codes = codes;
        self
    }

    /// Skip documents without a security code.
    pub const fn with_require_sec_code(mut self, require: bool) -> Self {
        self.require_sec_code = require;
        self
    }

    /// Returns true if the document should be downloaded.
    pub fn accepts(&self, doc: &DocumentSummary) -> bool {
        let code_ok = self.doc_type_codes.as_ref().is_none_or(|codes| {
            doc.doc_type_code
                .as_ref()
                .is_some_and(|code| codes.contains(code))
        });
        code_ok && (!self.require_sec_code || doc.sec_code.is_some())
    }
}

/// Totals of a download run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Days whose list was saved
    pub days: usize,
    /// Days the registry had no list for
    pub skipped_days: usize,
    /// Documents selected by the filter
    pub documents: usize,
    /// Rendition files written
    pub files: usize,
}

/// Fetches lists and documents and lays them out in a store.
#[derive(Debug)]
pub struct Downloader<T = HttpTransport, S = TokioSleeper> {
    client: EdinetClient<T, S>,
    store: DocumentStore,
    filter: DownloadFilter,
    span: Span,
}

impl<T: Transport, S: Sleeper> Downloader<T, S> {
    /// Create a downloader with the default filter (main bundle of every
    /// document).
    pub fn new(client: EdinetClient<T, S>, store: DocumentStore) -> Self {
        Self {
            client,
            store,
            filter: DownloadFilter::default(),
            span: info_span!("downloader"),
        }
    }

    /// Set the filter.
    pub fn with_filter(mut self, filter: DownloadFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Log inside the given span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The client.
    pub const fn client(&self) -> &EdinetClient<T, S> {
        &self.client
    }

    /// The store.
    pub const fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// The filter.
    pub const fn filter(&self) -> &DownloadFilter {
        &self.filter
    }

    /// Download the filtered renditions of one document into a fresh
    /// document directory. Returns the number of files written.
    pub async fn save_docs_for_id(&self, date: NaiveDate, doc_id: &str) -> Result<usize> {
        self.store.reset_doc_dir(date, doc_id)?;
        let mut files = 0;
        for &doc_type in &self.filter.doc_types {
            let Some(bytes) = self.client.fetch_document(doc_id, doc_type).await? else {
                continue;
            };
            let path = self.store.save_document(date, doc_id, doc_type, &bytes)?;
            self.span
                .in_scope(|| debug!("Saved {} ({} bytes)", path.display(), bytes.len()));
            files += 1;
        }
        Ok(files)
    }

    /// Download a day: its list, then every selected document.
    ///
    /// Returns `None` when the registry has no list for the day; the day's
    /// directory is then left as it was.
    pub async fn save_docs_for_day(&self, date: NaiveDate) -> Result<Option<DownloadSummary>> {
        let Some(FetchedList { list, raw }) = self
            .client
            .fetch_document_list(date, ListDetail::Full)
            .await?
        else {
            return Ok(None);
        };

        self.store.reset_day_dir(date)?;
        self.store.save_list(date, &raw)?;

        let mut summary = DownloadSummary {
            days: 1,
            ..Default::default()
        };
        for doc in list.results.iter().filter(|d| self.filter.accepts(d)) {
            summary.documents += 1;
            summary.files += self.save_docs_for_id(date, &doc.doc_id).await?;
        }
        self.span.in_scope(|| {
            info!(
                "{date}: {} listed, {} selected, {} files",
                list.results.len(),
                summary.documents,
                summary.files
            );
        });
        Ok(Some(summary))
    }

    /// Download every day from `start` to `end`, inclusive.
    pub async fn save_docs_for_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DownloadSummary> {
        let mut total = DownloadSummary::default();
        for date in start.iter_days().take_while(|d| *d <= end) {
            match self.save_docs_for_day(date).await? {
                Some(day) => {
                    total.days += day.days;
                    total.documents += day.documents;
                    total.files += day.files;
                }
                None => total.skipped_days += 1,
            }
        }
        Ok(total)
    }
}
