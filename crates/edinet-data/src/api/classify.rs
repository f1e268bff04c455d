//! Classification of registry responses into fetch outcomes.
//!
//! | content type | status | outcome |
//! |---|---|---|
//! | JSON | 200 (list) / matching binary (document) | success |
//! | JSON | 404 | skip |
//! | JSON | other 4xx | fatal |
//! | JSON | 200 (document), 5xx | retry when the policy allows it, fatal otherwise |
//! | JSON | anything else | fatal |
//! | HTML | any | retry when the policy allows it, fatal otherwise |
//! | other | any | fatal |

use super::retry::RetryPolicy;
use super::transport::RawResponse;
use super::types::DocType;
use crate::error::DataError;
use serde_json::Value;

/// Result of a single request attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    /// The payload was received
    Success(T),
    /// The registry has nothing for this request; move on
    Skip(String),
    /// Transient failure; the request may be re-issued
    Retry(String),
    /// Permanent failure
    Fatal {
        /// Formatted server message
        message: String,
        /// Status reported by the registry, if known
        status: Option<u16>,
    },
}

/// What a successful response looks like for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// JSON document list with status 200
    DocumentList,
    /// Binary body of the given rendition
    Document(DocType),
}

/// Coarse kind of a `Content-Type` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentKind {
    Json,
    Html,
    Other,
}

const JSON_TYPE: &str = "application/json";
const HTML_TYPE: &str = "text/html";

/// Lower-case the header and strip whitespace (`application/json; charset=utf-8`
/// and `application/json;charset=utf-8` both occur).
fn normalize_content_type(content_type: Option<&str>) -> String {
    content_type
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn content_kind(normalized: &str) -> ContentKind {
    if normalized.starts_with(JSON_TYPE) {
        ContentKind::Json
    } else if normalized.starts_with(HTML_TYPE) {
        ContentKind::Html
    } else {
        ContentKind::Other
    }
}

/// Status and message carried by a JSON body.
///
/// v1 responses nest them under `metadata` (status as a string), v2 error
/// responses put `statusCode` at the top level. The API gateway spells it
/// `StatusCode` when it rejects the subscription key.
fn json_status(body: &[u8]) -> Option<(u16, String)> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let (status, message) = match value.get("metadata") {
        Some(meta) => (meta.get("status")?, meta.get("message")),
        None => (
            value.get("statusCode").or_else(|| value.get("StatusCode"))?,
            value.get("message"),
        ),
    };
    let status = match status {
        Value::String(s) => s.trim().parse().ok()?,
        Value::Number(n) => u16::try_from(n.as_u64()?).ok()?,
        _ => return None,
    };
    let message = message
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some((status, message))
}

/// Outcome for a failure that may be retried, depending on the policy.
pub fn retry_or_fatal<T>(policy: &RetryPolicy, message: String, status: Option<u16>) -> FetchOutcome<T> {
    if policy.is_enabled() {
        FetchOutcome::Retry(message)
    } else {
        FetchOutcome::Fatal { message, status }
    }
}

/// Classify a transport failure.
pub fn classify_error<T>(error: &DataError, policy: &RetryPolicy) -> FetchOutcome<T> {
    match error {
        DataError::Network(_) => retry_or_fatal(policy, error.to_string(), None),
        other => FetchOutcome::Fatal {
            message: other.to_string(),
            status: None,
        },
    }
}

/// Classify one response.
///
/// On success the body is handed back untouched.
pub fn classify(
    response: RawResponse,
    expected: Expectation,
    policy: &RetryPolicy,
) -> FetchOutcome<Vec<u8>> {
    let content_type = normalize_content_type(response.content_type.as_deref());
    let kind = content_kind(&content_type);

    if let Expectation::Document(doc_type) = expected
        && content_type == doc_type.expected_content_type()
    {
        return FetchOutcome::Success(response.body);
    }

    match kind {
        ContentKind::Json => {
            let (status, message) = json_status(&response.body)
                .unwrap_or_else(|| (response.status, String::new()));
            let formatted = format!("{message}({status})");
            match status {
                200 if expected == Expectation::DocumentList => {
                    FetchOutcome::Success(response.body)
                }
                404 => FetchOutcome::Skip(formatted),
                200 | 500.. => retry_or_fatal(policy, formatted, Some(status)),
                _ => FetchOutcome::Fatal {
                    message: formatted,
                    status: Some(status),
                },
            }
        }
        ContentKind::Html => retry_or_fatal(
            policy,
            format!("Invalid content type ({content_type})"),
            Some(response.status),
        ),
        ContentKind::Other => FetchOutcome::Fatal {
            message: format!("Unexpected content type ({content_type})!!"),
            status: Some(response.status),
        },
    }
}
