//! Auto-waiting
//!
//! UI state settles asynchronously (AJAX responses, animations, overlays),
//! so checks are retried until they pass or a deadline expires.

use crate::error::{BrowserError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// How long to keep retrying and how often
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            interval: Duration::from_millis(100),
        }
    }
}

impl WaitOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Call `check` until it yields `Some`, or fail with `Timeout` naming `what`
///
/// The check always runs at least once, even with a zero timeout. Errors
/// from the check stop the wait immediately.
pub async fn poll_until<F, Fut, T>(what: &str, options: WaitOptions, mut check: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let start = Instant::now();
    let mut attempts = 0usize;

    loop {
        attempts += 1;
        if let Some(value) = check().await? {
            if attempts > 1 {
                log::debug!("'{}' satisfied after {} attempts", what, attempts);
            }
            return Ok(value);
        }

        let elapsed = start.elapsed();
        if elapsed >= options.timeout {
            log::warn!("Gave up waiting for {} after {} attempts", what, attempts);
            return Err(BrowserError::Timeout {
                what: what.to_string(),
                elapsed,
            });
        }

        tokio::time::sleep(options.interval.min(options.timeout - elapsed)).await;
    }
}

/// Run `fut` under a deadline, mapping expiry to `Timeout`
pub async fn with_deadline<F, T>(what: &str, deadline: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(BrowserError::Timeout {
            what: what.to_string(),
            elapsed: deadline,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fast() -> WaitOptions {
        WaitOptions::default()
            .with_timeout(Duration::from_millis(200))
            .with_interval(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_poll_until_returns_first_hit() {
        let calls = Cell::new(0);
        let value = poll_until("third call", fast(), || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { Ok((n == 3).then_some(n)) }
        })
        .await
        .unwrap();

        assert_eq!(value, 3);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_poll_until_times_out() {
        let result: Result<()> = poll_until("never", fast(), || async { Ok(None) }).await;
        match result {
            Err(BrowserError::Timeout { what, elapsed }) => {
                assert_eq!(what, "never");
                assert!(elapsed >= Duration::from_millis(200));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_poll_until_checks_once_with_zero_timeout() {
        let calls = Cell::new(0);
        let result: Result<()> = poll_until(
            "zero",
            WaitOptions::default().with_timeout(Duration::ZERO),
            || {
                calls.set(calls.get() + 1);
                async { Ok(None) }
            },
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_poll_until_propagates_check_error() {
        let result: Result<()> = poll_until("broken", fast(), || async {
            Err(BrowserError::NoPage)
        })
        .await;
        assert!(matches!(result, Err(BrowserError::NoPage)));
    }

    #[tokio::test]
    async fn test_with_deadline() {
        let ok = with_deadline("quick", Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let slow = with_deadline("slow", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(slow, Err(BrowserError::Timeout { .. })));
    }
}
