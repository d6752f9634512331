//! Retry on throttling.
//!
//! Remote calls that come back throttled are retried after a fixed delay;
//! anything else propagates at once. The default policy never gives up,
//! which is what keeps a long discovery walk alive through rate-limit bursts.

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backon::{ConstantBuilder, Retryable};

use crate::sync::{ProgressCallback, SyncProgress, emit};

/// Fixed wait between throttled attempts.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 3000;

/// How throttled calls are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wait before each retry.
    pub delay: Duration,
    /// Retries allowed after the first attempt. `None` retries forever.
    pub max_attempts: Option<usize>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    /// Give up after `max_attempts` retries.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Constant backoff, no jitter.
    #[must_use]
    pub fn into_backoff(self) -> ConstantBuilder {
        let builder = ConstantBuilder::default().with_delay(self.delay);
        match self.max_attempts {
            Some(n) => builder.with_max_times(n),
            None => builder.without_max_times(),
        }
    }
}

/// Run `operation`, retrying while `is_throttled` says the failure was a
/// throttle signal.
///
/// Each retry is logged at `warn` and reported as [`SyncProgress::Throttled`].
/// Non-throttle errors are returned unchanged on first sight. With a capped
/// policy the last throttle error is returned once the cap is hit.
///
/// # Example
///
/// ```ignore
/// let page = retry_on_throttle(
///     || client.discover_page(3),
///     TmdbError::is_throttled,
///     &RetryPolicy::default(),
///     "discover page 3",
///     on_progress,
/// )
/// .await?;
/// ```
pub async fn retry_on_throttle<T, E, F, Fut, IsThrottled>(
    mut operation: F,
    is_throttled: IsThrottled,
    policy: &RetryPolicy,
    context: &str,
    on_progress: Option<&ProgressCallback>,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    IsThrottled: Fn(&E) -> bool,
{
    let attempt = AtomicU32::new(0);

    let op = || {
        attempt.fetch_add(1, Ordering::SeqCst);
        operation()
    };

    op.retry(policy.into_backoff())
        .notify(|err: &E, dur: Duration| {
            let current = attempt.load(Ordering::SeqCst);
            tracing::warn!(
                context,
                attempt = current,
                retry_after_ms = dur.as_millis() as u64,
                error = %err,
                "Throttled, retrying"
            );
            emit(
                on_progress,
                SyncProgress::Throttled {
                    context: context.to_string(),
                    retry_after_ms: dur.as_millis() as u64,
                    attempt: current,
                },
            );
        })
        .when(|e: &E| is_throttled(e))
        .await
}
