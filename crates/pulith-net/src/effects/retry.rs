//! Retry execution for asynchronous operations.

use std::future::Future;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::data::RetryPolicy;

/// Run `op`, re-attempting on `Err` as described by `policy`.
///
/// `op` is invoked up to `policy.retries` times under guard; each failure is
/// followed by the next delay of the policy's schedule. After that, one final
/// attempt runs unguarded and its outcome, success or failure, is returned
/// as is.
///
/// Attempts are strictly sequential. Retrying a non-idempotent operation
/// repeats its side effects; deduplication is the caller's concern.
///
/// # Examples
///
/// ```
/// use pulith_net::{RetryPolicy, retry};
/// use std::time::Duration;
///
/// # tokio_test();
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn tokio_test() {
/// let policy = RetryPolicy::fixed().backoff(pulith_net::Backoff::Fixed(Duration::ZERO));
/// let mut calls = 0;
/// let value = retry(&policy, || {
///     calls += 1;
///     let attempt = calls;
///     async move { if attempt < 3 { Err("not yet") } else { Ok(attempt) } }
/// })
/// .await;
///
/// assert_eq!(value, Ok(3));
/// # }
/// ```
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry_if(policy, op, Result::is_err).await
}

/// [`retry`] for operations that produce no value.
pub async fn retry_unit<E, F, Fut>(policy: &RetryPolicy, op: F) -> Result<(), E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    retry(policy, op).await
}

/// Run `op`, re-attempting whenever `should_retry` judges the outcome retryable.
///
/// Unlike [`retry`], successful outcomes can be retried too, which lets
/// callers treat some values (e.g. a 503 response) as transient.
pub async fn retry_if<T, E, F, Fut, P>(policy: &RetryPolicy, mut op: F, mut should_retry: P) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&Result<T, E>) -> bool,
{
    let delays = policy.delays();

    for (attempt, delay) in delays.into_iter().enumerate() {
        let outcome = op().await;
        if !should_retry(&outcome) {
            if attempt > 0 {
                debug!(attempt = attempt + 1, "attempt settled after retrying");
            }
            return outcome;
        }

        warn!(
            attempt = attempt + 1,
            max_attempts = policy.max_attempts(),
            delay = ?delay,
            "attempt failed; retrying"
        );
        sleep(delay).await;
    }

    op().await
}
