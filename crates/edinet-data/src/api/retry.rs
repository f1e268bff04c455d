//! Retry controller.
//!
//! Requests are driven through an explicit state machine:
//!
//! ```text
//! Attempting ──Success/Skip/Fatal──▶ Done
//!     │  ▲
//!   Retry│  │interval elapsed
//!     ▼  │
//!   Waiting
//! ```
//!
//! There is no attempt cap: a request that keeps coming back retryable is
//! re-issued until it succeeds, is skipped or fails permanently. After every
//! attempt, whatever its outcome, the controller sleeps a fixed courtesy delay
//! so that the registry never sees back-to-back requests.

use super::classify::FetchOutcome;
use std::future::Future;
use std::time::Duration;
use tracing::{Span, debug, warn};

/// Default courtesy delay after every request
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(1);

/// Whether, and how often, retryable failures are re-issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    interval: Option<Duration>,
}

impl RetryPolicy {
    /// Never retry: retryable failures become fatal.
    pub const fn disabled() -> Self {
        Self { interval: None }
    }

    /// Retry after a fixed interval.
    pub const fn every(interval: Duration) -> Self {
        Self {
            interval: Some(interval),
        }
    }

    /// Retry interval, if retries are enabled.
    pub const fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Returns true if retryable failures are re-issued.
    pub const fn is_enabled(&self) -> bool {
        self.interval.is_some()
    }
}

/// Blocks the calling flow for a duration.
///
/// Injected into the controller so that tests can observe waits without
/// actually sleeping.
pub trait Sleeper: Send + Sync {
    /// Sleep for `duration`.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// [`Sleeper`] backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Terminal result of a retried request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// Payload received
    Success(T),
    /// Nothing to fetch; the caller moves on
    Skipped(String),
    /// Permanent failure
    Failed {
        /// Formatted server message
        message: String,
        /// Status reported by the registry, if known
        status: Option<u16>,
    },
}

/// State of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryState<T> {
    /// About to issue attempt number `attempt` (1-based)
    Attempting {
        /// Attempt number
        attempt: u32,
    },
    /// Attempt `attempt` was retryable; waiting before the next one
    Waiting {
        /// Attempt that failed
        attempt: u32,
        /// How long to wait
        interval: Duration,
        /// Why the attempt failed
        reason: String,
    },
    /// Finished
    Done(Resolution<T>),
}

impl<T> RetryState<T> {
    /// State after attempt `attempt` produced `outcome`.
    pub fn after_attempt(attempt: u32, outcome: FetchOutcome<T>, policy: &RetryPolicy) -> Self {
        match outcome {
            FetchOutcome::Success(payload) => Self::Done(Resolution::Success(payload)),
            FetchOutcome::Skip(message) => Self::Done(Resolution::Skipped(message)),
            FetchOutcome::Fatal { message, status } => {
                Self::Done(Resolution::Failed { message, status })
            }
            FetchOutcome::Retry(reason) => match policy.interval() {
                Some(interval) => Self::Waiting {
                    attempt,
                    interval,
                    reason,
                },
                None => Self::Done(Resolution::Failed {
                    message: reason,
                    status: None,
                }),
            },
        }
    }
}

/// Drives requests through [`RetryState`] until they finish.
#[derive(Debug, Clone)]
pub struct RetryController<S = TokioSleeper> {
    policy: RetryPolicy,
    request_delay: Duration,
    sleeper: S,
    span: Span,
}

impl RetryController<TokioSleeper> {
    /// Controller using the tokio timer.
    pub fn new(policy: RetryPolicy, request_delay: Duration) -> Self {
        Self::with_sleeper(policy, request_delay, TokioSleeper)
    }
}

impl<S: Sleeper> RetryController<S> {
    /// Controller with a custom sleeper.
    pub fn with_sleeper(policy: RetryPolicy, request_delay: Duration, sleeper: S) -> Self {
        Self {
            policy,
            request_delay,
            sleeper,
            span: Span::current(),
        }
    }

    /// Log inside the given span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The retry policy.
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The sleeper.
    pub const fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Run `attempt` until it resolves.
    ///
    /// `label` names the request in log lines.
    pub async fn run<T, F, Fut>(&self, label: &str, mut attempt: F) -> Resolution<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = FetchOutcome<T>>,
    {
        let mut state = RetryState::Attempting { attempt: 1 };
        loop {
            state = match state {
                RetryState::Attempting { attempt: n } => {
                    self.span.in_scope(|| debug!(attempt = n, "fetching {label}"));
                    let outcome = attempt().await;
                    self.sleeper.sleep(self.request_delay).await;
                    RetryState::after_attempt(n, outcome, &self.policy)
                }
                RetryState::Waiting {
                    attempt: n,
                    interval,
                    reason,
                } => {
                    self.span.in_scope(|| {
                        warn!(attempt = n, "Failed to fetch {label}: {reason}");
                        warn!("Wait for retry ({}sec) ...", interval.as_secs_f64());
                    });
                    self.sleeper.sleep(interval).await;
                    RetryState::Attempting { attempt: n + 1 }
                }
                RetryState::Done(resolution) => return resolution,
            };
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingSleeper;
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const DELAY: Duration = Duration::from_secs(1);
    const INTERVAL: Duration = Duration::from_secs(60);

    fn scripted(outcomes: Vec<FetchOutcome<u32>>) -> Mutex<VecDeque<FetchOutcome<u32>>> {
        Mutex::new(outcomes.into())
    }

    #[test]
    fn test_policy() {
        assert!(!RetryPolicy::default().is_enabled());
        assert!(!RetryPolicy::disabled().is_enabled());
        assert_eq!(RetryPolicy::every(INTERVAL).interval(), Some(INTERVAL));
    }

    #[test]
    fn test_transitions() {
        let policy = RetryPolicy::every(INTERVAL);
        assert_eq!(
            RetryState::after_attempt(1, FetchOutcome::Success(7), &policy),
            RetryState::Done(Resolution::Success(7))
        );
        assert_eq!(
            RetryState::<u32>::after_attempt(2, FetchOutcome::Retry("busy".into()), &policy),
            RetryState::Waiting {
                attempt: 2,
                interval: INTERVAL,
                reason: "busy".into()
            }
        );
        let disabled =
            RetryState::<u32>::after_attempt(1, FetchOutcome::Retry("busy".into()), &RetryPolicy::disabled());
        assert!(matches!(disabled, RetryState::Done(Resolution::Failed { .. })));
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let sleeper = RecordingSleeper::default();
        let controller =
            RetryController::with_sleeper(RetryPolicy::every(INTERVAL), DELAY, sleeper.clone());
        let script = scripted(vec![
            FetchOutcome::Retry("500".into()),
            FetchOutcome::Retry("html".into()),
            FetchOutcome::Success(42),
        ]);

        let resolution = controller
            .run("test", || {
                let next = script.lock().unwrap().pop_front().unwrap();
                async move { next }
            })
            .await;

        assert_eq!(resolution, Resolution::Success(42));
        assert_eq!(
            sleeper.sleeps(),
            vec![DELAY, INTERVAL, DELAY, INTERVAL, DELAY]
        );
    }

    #[tokio::test]
    async fn test_courtesy_delay_applies_to_terminal_outcomes() {
        for outcome in [
            FetchOutcome::Skip("404".into()),
            FetchOutcome::Fatal {
                message: "400".into(),
                status: Some(400),
            },
        ] {
            let sleeper = RecordingSleeper::default();
            let controller =
                RetryController::with_sleeper(RetryPolicy::every(INTERVAL), DELAY, sleeper.clone());
            let script = scripted(vec![outcome]);
            let resolution = controller
                .run("test", || {
                    let next = script.lock().unwrap().pop_front().unwrap();
                    async move { next }
                })
                .await;
            assert!(!matches!(resolution, Resolution::Success(_)));
            assert_eq!(sleeper.sleeps(), vec![DELAY]);
        }
    }

    #[tokio::test]
    async fn test_disabled_policy_never_waits() {
        let sleeper = RecordingSleeper::default();
        let controller =
            RetryController::with_sleeper(RetryPolicy::disabled(), DELAY, sleeper.clone());
        let resolution = controller
            .run("test", || async { FetchOutcome::<u32>::Retry("busy".into()) })
            .await;
        assert_eq!(
            resolution,
            Resolution::Failed {
                message: "busy".into(),
                status: None
            }
        );
        assert_eq!(sleeper.sleeps(), vec![DELAY]);
    }
}
