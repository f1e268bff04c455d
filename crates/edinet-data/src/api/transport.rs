//! HTTP transport behind the fetch client.

use crate::error::{DataError, Result};
use std::future::Future;
use std::time::Duration;

/// User agent sent with every request
const USER_AGENT: &str = "edinet-data/0.1 (https://github.com/factordynamics/edinet)";

/// Status line, content type and body of one HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Value of the `Content-Type` header, if present
    pub content_type: Option<String>,
    /// Response body
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Create a response.
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: content_type.map(str::to_string),
            body: body.into(),
        }
    }
}

/// Issues GET requests.
///
/// Errors returned here are transport failures ([`DataError::Network`]); any
/// response that made it back, whatever its status, is an `Ok`.
pub trait Transport: Send + Sync {
    /// Send a GET request with the given query parameters.
    fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> impl Future<Output = Result<RawResponse>> + Send;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap a pre-configured client.
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<RawResponse> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| DataError::Network(format!("GET {url}: {e}")))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| DataError::Network(format!("reading body of {url}: {e}")))?
            .to_vec();

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}
