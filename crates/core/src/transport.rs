//! Bounded-retry download loop.
//!
//! A [`Transport`] performs one GET per call. [`fetch_with_retries`] owns the
//! attempt count: attempts run back to back with no delay, every failure is
//! recorded and swallowed, and only the aggregate [`RetryExhausted`] leaves
//! the loop.

use async_trait::async_trait;
use bytes::Bytes;

/// Why a single download attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttemptFailure {
    /// The server answered with anything other than 200.
    #[error("status {0}")]
    Status(u16),

    /// The attempt did not complete within the configured timeout.
    #[error("timed out")]
    Timeout,

    /// Connection, TLS or body read error.
    #[error("network error: {0}")]
    Network(String),

    /// The response body exceeds the configured limit.
    #[error("body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    /// The link could not be parsed as an http(s) URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// A single HTTP GET.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url` once. Only an HTTP 200 response yields bytes.
    async fn fetch_once(&self, url: &str) -> Result<Bytes, AttemptFailure>;
}

/// Receives progress notifications. Every method defaults to doing nothing.
pub trait Reporter: Send + Sync {
    /// An attempt on `url` is about to start (`attempt` is 1-based).
    fn attempt_started(&self, _url: &str, _attempt: u32, _limit: u32) {}

    /// The attempt finished; `failure` is `None` on success.
    fn attempt_finished(&self, _url: &str, _attempt: u32, _limit: u32, _failure: Option<&AttemptFailure>) {}

    /// Downloaded bytes are about to be written to `path`.
    fn saving(&self, _path: &std::path::Path) {}

    /// The write to `path` completed.
    fn saved(&self, _path: &std::path::Path) {}
}

/// A [`Reporter`] that drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {}

/// Every attempt on a link failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("FETCH_FAILED: {url} after {} attempt(s)", .failures.len())]
pub struct RetryExhausted {
    pub url: String,
    /// One entry per attempt, in order.
    pub failures: Vec<AttemptFailure>,
}

/// Try `url` up to `retry_limit` times, returning the first successful body.
pub async fn fetch_with_retries<T>(
    transport: &T, url: &str, retry_limit: u32, reporter: &dyn Reporter,
) -> Result<Bytes, RetryExhausted>
where
    T: Transport + ?Sized,
{
    let mut failures = Vec::new();

    for attempt in 1..=retry_limit {
        reporter.attempt_started(url, attempt, retry_limit);

        match transport.fetch_once(url).await {
            Ok(bytes) => {
                reporter.attempt_finished(url, attempt, retry_limit, None);
                tracing::debug!("attempt {}/{} on {} succeeded ({} bytes)", attempt, retry_limit, url, bytes.len());
                return Ok(bytes);
            }
            Err(failure) => {
                reporter.attempt_finished(url, attempt, retry_limit, Some(&failure));
                tracing::debug!("attempt {}/{} on {} failed: {}", attempt, retry_limit, url, failure);
                failures.push(failure);
            }
        }
    }

    Err(RetryExhausted { url: url.to_string(), failures })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted results, failing with 404 once the script runs out.
    struct Scripted {
        script: Mutex<VecDeque<Result<Bytes, AttemptFailure>>>,
        calls: Mutex<u32>,
    }

    impl Scripted {
        fn new(script: Vec<Result<Bytes, AttemptFailure>>) -> Self {
            Self { script: Mutex::new(script.into()), calls: Mutex::new(0) }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn fetch_once(&self, _url: &str) -> Result<Bytes, AttemptFailure> {
            *self.calls.lock().unwrap() += 1;
            self.script.lock().unwrap().pop_front().unwrap_or(Err(AttemptFailure::Status(404)))
        }
    }

    #[derive(Default)]
    struct Recording {
        events: Mutex<Vec<String>>,
    }

    impl Reporter for Recording {
        fn attempt_started(&self, _url: &str, attempt: u32, limit: u32) {
            self.events.lock().unwrap().push(format!("start {attempt}/{limit}"));
        }

        fn attempt_finished(&self, _url: &str, attempt: u32, _limit: u32, failure: Option<&AttemptFailure>) {
            let outcome = if failure.is_some() { "FAILED" } else { "SUCCESS" };
            self.events.lock().unwrap().push(format!("end {attempt} {outcome}"));
        }
    }

    #[tokio::test]
    async fn test_first_attempt_success() {
        let transport = Scripted::new(vec![Ok(Bytes::from_static(b"data"))]);
        let bytes = fetch_with_retries(&transport, "http://h/f.xlsx", 3, &SilentReporter).await.unwrap();
        assert_eq!(bytes, Bytes::from_static(b"data"));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_success_on_last_attempt() {
        let transport = Scripted::new(vec![
            Err(AttemptFailure::Status(500)),
            Err(AttemptFailure::Timeout),
            Ok(Bytes::from_static(b"data")),
        ]);
        let result = fetch_with_retries(&transport, "http://h/f.xlsx", 3, &SilentReporter).await;
        assert!(result.is_ok());
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_all_attempts_fail() {
        let transport = Scripted::new(vec![
            Err(AttemptFailure::Status(404)),
            Err(AttemptFailure::Network("connection refused".into())),
            Err(AttemptFailure::Timeout),
        ]);
        let err = fetch_with_retries(&transport, "http://h/f.xlsx", 3, &SilentReporter).await.unwrap_err();

        assert_eq!(transport.calls(), 3);
        assert_eq!(err.url, "http://h/f.xlsx");
        assert_eq!(
            err.failures,
            vec![
                AttemptFailure::Status(404),
                AttemptFailure::Network("connection refused".into()),
                AttemptFailure::Timeout
            ]
        );
        assert!(err.to_string().contains("3 attempt(s)"));
    }

    #[tokio::test]
    async fn test_never_exceeds_limit() {
        let transport = Scripted::new(vec![]);
        for limit in [1, 2, 5] {
            let before = transport.calls();
            let result = fetch_with_retries(&transport, "http://h/f.xlsx", limit, &SilentReporter).await;
            assert!(result.is_err());
            assert_eq!(transport.calls() - before, limit);
        }
    }

    #[tokio::test]
    async fn test_success_after_budget_is_not_reached() {
        let transport = Scripted::new(vec![
            Err(AttemptFailure::Status(503)),
            Err(AttemptFailure::Status(503)),
            Ok(Bytes::from_static(b"late")),
        ]);
        let result = fetch_with_retries(&transport, "http://h/f.xlsx", 2, &SilentReporter).await;
        assert!(result.is_err());
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_one_notification_pair_per_attempt() {
        let transport = Scripted::new(vec![Err(AttemptFailure::Status(404)), Ok(Bytes::from_static(b"x"))]);
        let reporter = Recording::default();
        fetch_with_retries(&transport, "http://h/f.xlsx", 3, &reporter).await.unwrap();

        assert_eq!(
            *reporter.events.lock().unwrap(),
            vec!["start 1/3", "end 1 FAILED", "start 2/3", "end 2 SUCCESS"]
        );
    }
}
