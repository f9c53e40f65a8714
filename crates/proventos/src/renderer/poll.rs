//! Bounded polling for page conditions that settle over time.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Call `check` every `interval` until it reports `true` or `timeout` runs out.
///
/// The check always runs at least once, and once more at the deadline. A failed
/// check counts as "not yet": the page may be mid-navigation while the user
/// signs in, and the next check usually succeeds.
pub async fn poll_until<F, Fut>(timeout: Duration, interval: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        match check().await {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => debug!("check failed, retrying: {e}"),
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const INTERVAL: Duration = Duration::from_millis(250);

    #[tokio::test(start_paused = true)]
    async fn test_true_before_deadline() {
        let calls = AtomicUsize::new(0);
        let start = Instant::now();
        let seen = poll_until(Duration::from_secs(120), INTERVAL, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(n >= 2) }
        })
        .await;

        assert!(seen);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_at_deadline() {
        let calls = AtomicUsize::new(0);
        let start = Instant::now();
        let seen = poll_until(Duration::from_millis(600), INTERVAL, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(false) }
        })
        .await;

        assert!(!seen);
        // Checks at 0, 250 and 500ms, then a last one clamped to the 600ms deadline.
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(start.elapsed(), Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_errors_are_retried() {
        let calls = AtomicUsize::new(0);
        let seen = poll_until(Duration::from_secs(5), INTERVAL, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(ExtractError::Query("Execution context was destroyed".into()))
                } else {
                    Ok(true)
                }
            }
        })
        .await;

        assert!(seen);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_checks_once() {
        let calls = AtomicUsize::new(0);
        let seen = poll_until(Duration::ZERO, INTERVAL, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(false) }
        })
        .await;

        assert!(!seen);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
