//! Bounded fixed-delay retry for page fetches.
//!
//! Every page-fetch failure (transport error or non-success status) is
//! considered transient and retried until the attempt budget is spent; the
//! delay is parameterized so tests can run with `Duration::ZERO`.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Executes `operation` up to `max_attempts` times, sleeping `delay` between
/// attempts.
///
/// Returns the first success, or the error from the final attempt once the
/// budget is exhausted. `max_attempts` is the total attempt count, first try
/// included; a value of 0 is treated as 1.
pub(crate) async fn retry_fixed<T, F, Fut>(
    max_attempts: u32,
    delay: Duration,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 1u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= max_attempts {
                    return Err(err);
                }
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_secs = delay.as_secs_f64(),
                    error = %err,
                    "page fetch attempt failed, retrying after delay"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
