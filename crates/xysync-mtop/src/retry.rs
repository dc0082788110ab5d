//! Bounded retry for throttled calls.
//!
//! Only rate-limit rejections are retried, with a linear backoff
//! (`attempt × backoff_base`). Any other error is returned as-is on the
//! first occurrence.

use std::future::Future;
use std::time::Duration;

use crate::error::MtopError;

/// Runs `operation` up to `max_attempts` times in total.
///
/// | Attempt | Sleep before it           |
/// |---------|---------------------------|
/// | 1       | none                      |
/// | 2       | 1 × `backoff_base`        |
/// | 3       | 2 × `backoff_base`        |
///
/// A `max_attempts` of zero is treated as one. When every attempt is
/// throttled, the last error is wrapped in [`MtopError::RetriesExhausted`].
pub(crate) async fn retry_rate_limited<T, F, Fut>(
    max_attempts: u32,
    backoff_base: Duration,
    mut operation: F,
) -> Result<T, MtopError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, MtopError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        if attempt > 0 {
            let delay = backoff_base.saturating_mul(attempt);
            tracing::warn!(
                attempt,
                max_attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "rate limited, retrying after backoff"
            );
            tokio::time::sleep(delay).await;
        }

        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_rate_limited() => return Err(err),
            Err(err) => {
                attempt += 1;
                if attempt >= max_attempts {
                    return Err(MtopError::RetriesExhausted {
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }
            }
        }
    }
}
