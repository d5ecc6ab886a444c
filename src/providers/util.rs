use anyhow::Error;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Runs a remote request, retrying up to `retries` more times with a fixed
/// `delay_ms` pause. `what` names the request in log lines.
///
/// The last error is returned once the attempts run out.
pub async fn with_retry<F, Fut, T, E>(
    what: &str,
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<Error>,
{
    let attempts = retries + 1;
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) if attempt < attempts => {
                let err: Error = err.into();
                debug!(attempt, attempts, error = %err, "{} failed, retrying", what);
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            Err(err) => {
                let err: Error = err.into();
                warn!(attempts, error = %err, "{} failed", what);
                return Err(err);
            }
        }
    }
}
