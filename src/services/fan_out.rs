//! Bounded, timed fan-out of independent remote calls.

use crate::config::FanOutConfig;
use crate::error::AppError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Run `call` once per item and collect the outcomes in input order.
///
/// At most `config.max_concurrency` calls run at once. Each call gets
/// `config.call_timeout()` once it holds a permit; a timed-out or panicked
/// call becomes an error for that item only.
pub async fn run_bounded<I, T, F, Fut>(
    items: Vec<I>,
    config: FanOutConfig,
    call: F,
) -> Vec<(I, Result<T, AppError>)>
where
    I: Clone + Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T, AppError>> + Send + 'static,
{
    if items.is_empty() {
        return Vec::new();
    }

    let concurrency = config.max_concurrency.clamp(1, items.len());
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let timeout = config.call_timeout();

    let mut handles = Vec::with_capacity(items.len());

    for item in items {
        let semaphore = Arc::clone(&semaphore);
        let pending = call(item.clone());

        let handle = tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return Err(AppError::internal("Semaphore closed unexpectedly")),
            };

            match tokio::time::timeout(timeout, pending).await {
                Ok(result) => result,
                Err(_) => Err(AppError::remote_call(format!(
                    "Remote call timed out after {}s",
                    timeout.as_secs()
                ))),
            }
        });

        handles.push((item, handle));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (item, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(AppError::internal(format!("Task failed: {}", e))),
        };
        results.push((item, result));
    }

    results
}
