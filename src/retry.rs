use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Bounded fixed-delay retry policy, injected wherever a remote call may flake.
///
/// Tests pass a zero delay to exercise the retry path without waiting.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Attempt ceiling, never below one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Run `f` up to the policy's attempt ceiling, sleeping the fixed delay
/// between failed attempts. Returns the first success or the last error.
pub async fn retry_async<F, Fut, T, E>(policy: RetryPolicy, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Debug,
{
    let attempts = policy.attempts();
    for attempt in 1..=attempts {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(
                    attempt,
                    max_attempts = attempts,
                    error = ?e,
                    "Attempt failed"
                );
                if attempt == attempts {
                    return Err(e);
                }
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
    unreachable!("retry loop returns on the final attempt")
}
