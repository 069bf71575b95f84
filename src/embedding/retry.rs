//! Bounded retry with exponential backoff for rate-limited calls.
//!
//! Only "rate limited" responses are retried; everything else propagates
//! immediately. The wait schedule doubles per attempt up to a cap, with a
//! small random jitter, unless the provider supplied an explicit
//! retry-after duration, which takes precedence.

use crate::error::{HenteError, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Cap on a single backoff wait.
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Upper bound of the random jitter added to each wait.
pub const MAX_JITTER: Duration = Duration::from_millis(300);

/// Outcome of a single call attempt, as seen by the retry driver.
pub enum CallError {
    /// HTTP 429, optionally carrying the provider's retry-after duration.
    RateLimited { retry_after: Option<Duration> },
    /// Anything else: not retried.
    Fatal(HenteError),
}

/// Backoff wait before retrying attempt `attempt` (0-based), jitter excluded.
///
/// An explicit provider retry-after takes precedence over the exponential
/// schedule `min(60s, 2^attempt * 1s)`.
pub fn backoff_delay(attempt: u32, retry_after: Option<Duration>) -> Duration {
    if let Some(delay) = retry_after {
        return delay;
    }
    let exp = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
    Duration::from_secs(exp).min(MAX_BACKOFF)
}

fn jitter() -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(0..MAX_JITTER.as_millis() as u64))
}

/// Drive `call` until it succeeds, fails hard, or exhausts `max_attempts`.
pub async fn with_backoff<T, F, Fut>(max_attempts: u32, mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, CallError>>,
{
    for attempt in 0..max_attempts {
        match call().await {
            Ok(value) => return Ok(value),
            Err(CallError::Fatal(e)) => return Err(e),
            Err(CallError::RateLimited { retry_after }) => {
                if attempt + 1 == max_attempts {
                    break;
                }
                let wait = backoff_delay(attempt, retry_after) + jitter();
                warn!(
                    "Rate limited (attempt {}/{}), retrying in {:?}",
                    attempt + 1,
                    max_attempts,
                    wait
                );
                tokio::time::sleep(wait).await;
            }
        }
    }

    Err(HenteError::RateLimited {
        attempts: max_attempts,
    })
}
