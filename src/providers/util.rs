use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retries an async operation a fixed number of times with a fixed delay
///
/// # Parameters
/// - `operation`: Closure receiving the 1-based attempt number and returning a future
/// - `attempts`: Total number of runs, including the first
/// - `delay`: Pause between consecutive attempts
///
/// # Returns
/// Either the first successful result or the error from the final attempt
pub async fn with_retry<F, Fut, T, E>(mut operation: F, attempts: usize, delay: Duration) -> Result<T, E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(val) => return Ok(val),
            Err(err) => {
                warn!("Attempt {}/{} failed: {}", attempt, attempts, err);
                if attempt >= attempts {
                    return Err(err);
                }
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
        }
    }
}
