//! EDINET API client with retry handling and request throttling.

use super::classify::{Expectation, classify, classify_error};
use super::retry::{
    DEFAULT_REQUEST_DELAY, Resolution, RetryController, RetryPolicy, Sleeper, TokioSleeper,
};
use super::transport::{HttpTransport, Transport};
use super::types::{DocType, DocumentIdentifier, FetchedList, ListDetail};
use crate::error::{DataError, Result};
use chrono::NaiveDate;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{Span, info, info_span, warn};

/// EDINET API base URL
pub const EDINET_BASE_URL: &str = "https://api.edinet-fsa.go.jp/api/v2";

/// Configuration of an [`EdinetClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (without trailing slash)
    pub base_url: String,
    /// Subscription key sent as the `Subscription-Key` query parameter
    pub api_key: Option<String>,
    /// What to do with retryable failures
    pub retry: RetryPolicy,
    /// Delay slept after every request
    pub request_delay: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: EDINET_BASE_URL.to_string(),
            api_key: None,
            retry: RetryPolicy::disabled(),
            request_delay: DEFAULT_REQUEST_DELAY,
            timeout: Duration::from_secs(60),
        }
    }
}

impl ClientConfig {
    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the subscription key.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Set the retry policy.
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the courtesy delay slept after every request.
    pub const fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }
}

/// EDINET API client.
///
/// Requests are strictly sequential: a client never has more than one
/// request in flight, even when shared between tasks.
pub struct EdinetClient<T = HttpTransport, S = TokioSleeper> {
    transport: T,
    retry: RetryController<S>,
    in_flight: Mutex<()>,
    base_url: String,
    api_key: Option<String>,
    span: Span,
}

impl EdinetClient {
    /// Create a new client with default settings (no retries, 1 s delay).
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client over HTTP.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::with_parts(config, transport, TokioSleeper))
    }
}

impl<T: Transport, S: Sleeper> EdinetClient<T, S> {
    /// Create a client from a transport and a sleeper.
    pub fn with_parts(config: ClientConfig, transport: T, sleeper: S) -> Self {
        let span = info_span!("edinet_client");
        let retry = RetryController::with_sleeper(config.retry, config.request_delay, sleeper)
            .with_span(span.clone());
        Self {
            transport,
            retry,
            in_flight: Mutex::new(()),
            base_url: config.base_url,
            api_key: config.api_key,
            span,
        }
    }

    /// Log inside the given span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.retry = self.retry.with_span(span.clone());
        self.span = span;
        self
    }

    /// The transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch the document list for a day, keeping the response body.
    ///
    /// Returns `Ok(None)` when the registry has no list for the day.
    ///
    /// # Errors
    /// Returns [`DataError::RemoteRejection`] when the registry rejects the
    /// request and retrying is not allowed.
    pub async fn fetch_document_list(
        &self,
        date: NaiveDate,
        detail: ListDetail,
    ) -> Result<Option<FetchedList>> {
        let url = format!("{}/documents.json", self.base_url);
        let query = vec![
            ("date", date.to_string()),
            ("type", detail.code().to_string()),
        ];
        let target = format!("document list (date: {date}, type: {})", detail.code());
        self.span
            .in_scope(|| info!("fetching document list (date: {date}, type: {})...", detail.code()));

        let Some(body) = self
            .fetch(&url, query, Expectation::DocumentList, target)
            .await?
        else {
            return Ok(None);
        };
        Ok(Some(FetchedList::from_body(body)?))
    }

    /// Fetch one rendition of a document.
    ///
    /// Returns `Ok(None)` when the registry does not have it.
    ///
    /// # Errors
    /// Returns [`DataError::RemoteRejection`] when the registry rejects the
    /// request and retrying is not allowed.
    pub async fn fetch_document(&self, doc_id: &str, doc_type: DocType) -> Result<Option<Vec<u8>>> {
        if doc_id.is_empty() {
            return Err(DataError::Parse("Empty document id".to_string()));
        }
        let id = DocumentIdentifier::new(doc_id, doc_type);
        let url = format!("{}/documents/{}", self.base_url, id.doc_id);
        let query = vec![("type", id.doc_type.code().to_string())];
        self.span.in_scope(|| info!("fetching {id}..."));

        self.fetch(&url, query, Expectation::Document(id.doc_type), id.to_string())
            .await
    }

    async fn fetch(
        &self,
        url: &str,
        mut query: Vec<(&str, String)>,
        expected: Expectation,
        target: String,
    ) -> Result<Option<Vec<u8>>> {
        if let Some(key) = &self.api_key {
            query.push(("Subscription-Key", key.clone()));
        }

        let _guard = self.in_flight.lock().await;

        let transport = &self.transport;
        let policy = self.retry.policy();
        let query = query.as_slice();
        let resolution = self
            .retry
            .run(&target, || async move {
                match transport.get(url, query).await {
                    Ok(response) => classify(response, expected, policy),
                    Err(e) => classify_error(&e, policy),
                }
            })
            .await;

        match resolution {
            Resolution::Success(body) => Ok(Some(body)),
            Resolution::Skipped(message) => {
                self.span.in_scope(|| {
                    warn!("Failed to fetch {target}: {message}");
                    warn!("Skip...");
                });
                Ok(None)
            }
            Resolution::Failed { message, status } => Err(DataError::RemoteRejection {
                target,
                message,
                status,
            }),
        }
    }
}

impl<T, S> std::fmt::Debug for EdinetClient<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdinetClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish_non_exhaustive()
    }
}
