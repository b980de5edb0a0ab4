//! Bounded waiting: poll a condition at a fixed interval until it holds
//! or the budget expires.
//!
//! Every scenario assertion goes through [`poll_until`], so an unmet
//! expectation surfaces as a `Timeout` result rather than an uncontrolled
//! panic, and the runner can attach expected/observed context.

use std::future::Future;
use std::time::{Duration, Instant};

use crate::result::{VitrinaError, VitrinaResult};

/// Default wait budget for a single assertion (4 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 4_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Options for a bounded wait
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    /// Total budget in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total budget in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Budget as a Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Polling interval as a Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Outcome of a successful bounded wait
#[derive(Debug, Clone)]
pub struct WaitOutcome {
    /// Time spent polling before the condition held
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
}

/// Poll `condition` until it returns `Ok(true)` or the budget expires.
///
/// The condition itself is fallible: a probe error (lost page, bad
/// evaluation) aborts the wait immediately rather than burning the budget.
/// On expiry the caller gets `VitrinaError::Timeout`.
pub async fn poll_until<F, Fut>(
    options: WaitOptions,
    description: &str,
    mut condition: F,
) -> VitrinaResult<WaitOutcome>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = VitrinaResult<bool>>,
{
    let start = Instant::now();
    loop {
        if condition().await? {
            return Ok(WaitOutcome {
                elapsed: start.elapsed(),
                waited_for: description.to_string(),
            });
        }
        if start.elapsed() >= options.timeout() {
            tracing::debug!(target: "vitrina::wait", %description, timeout_ms = options.timeout_ms, "wait expired");
            return Err(VitrinaError::Timeout {
                ms: options.timeout_ms,
            });
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_wait_options_defaults() {
        let opts = WaitOptions::default();
        assert_eq!(opts.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
        assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    fn test_wait_options_builders() {
        let opts = WaitOptions::new().with_timeout(250).with_poll_interval(10);
        assert_eq!(opts.timeout(), Duration::from_millis(250));
        assert_eq!(opts.poll_interval(), Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_poll_until_immediate_success() {
        let outcome = poll_until(WaitOptions::new().with_timeout(100), "truth", || async {
            Ok(true)
        })
        .await
        .unwrap();
        assert_eq!(outcome.waited_for, "truth");
    }

    #[tokio::test]
    async fn test_poll_until_eventual_success() {
        let attempts = Arc::new(AtomicU32::new(0));
        let seen = attempts.clone();
        let outcome = poll_until(
            WaitOptions::new().with_timeout(1000).with_poll_interval(5),
            "third try",
            move || {
                let seen = seen.clone();
                async move { Ok(seen.fetch_add(1, Ordering::SeqCst) >= 2) }
            },
        )
        .await
        .unwrap();
        assert!(outcome.elapsed >= Duration::from_millis(5));
        assert!(attempts.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn test_poll_until_times_out() {
        let result = poll_until(
            WaitOptions::new().with_timeout(50).with_poll_interval(10),
            "never",
            || async { Ok(false) },
        )
        .await;
        match result {
            Err(VitrinaError::Timeout { ms }) => assert_eq!(ms, 50),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_poll_until_propagates_probe_error() {
        let result = poll_until(
            WaitOptions::new().with_timeout(1000).with_poll_interval(10),
            "broken probe",
            || async {
                Err(VitrinaError::Eval {
                    message: "page gone".to_string(),
                })
            },
        )
        .await;
        assert!(matches!(result, Err(VitrinaError::Eval { .. })));
    }
}
