use std::sync::Arc;

use attsweep_client::{ClientError, TrackerClient};
use attsweep_core::{DeletionResult, SelectionEntry};
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::config::EngineConfig;
use crate::error::EngineError;

/// Outcome of one deletion batch: exactly one result per submitted
/// entry, in submission order.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub results: Vec<DeletionResult>,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeletionResult> {
        self.results.iter().filter(|r| !r.success)
    }

    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }
}

/// Delete every entry in the batch. Failures are isolated per entry:
/// one failed delete never stops the others, and the report carries one
/// `DeletionResult` per input entry in input order.
///
/// Retryable failures (rate limit, transport) are retried up to
/// `config.delete_retries` times with `config.retry_delay` between
/// attempts. Cancellation stops new deletes from being dispatched;
/// entries that never got dispatched are reported as failed.
pub async fn delete_selected<C>(
    client: Arc<C>,
    entries: Vec<SelectionEntry>,
    config: &EngineConfig,
    cancel: &CancelToken,
) -> Result<BatchReport, EngineError>
where
    C: TrackerClient + ?Sized + 'static,
{
    if entries.is_empty() {
        return Err(EngineError::Validation("nothing selected".into()));
    }

    let semaphore = Arc::new(Semaphore::new(config.delete_concurrency.max(1)));
    let retries = config.delete_retries;
    let retry_delay = config.retry_delay;
    let mut handles = Vec::with_capacity(entries.len());
    for (slot, entry) in entries.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        let client = client.clone();
        let cancel = cancel.clone();
        handles.push(tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    return (
                        slot,
                        DeletionResult::failed(entry, "cancelled before dispatch"),
                    )
                }
            };
            if cancel.is_cancelled() {
                return (
                    slot,
                    DeletionResult::failed(entry, "cancelled before dispatch"),
                );
            }
            let result = delete_entry(client.as_ref(), entry, retries, retry_delay).await;
            (slot, result)
        }));
    }

    let mut slots: Vec<Option<DeletionResult>> = handles.iter().map(|_| None).collect();
    for handle in handles {
        let (slot, result) = handle
            .await
            .map_err(|e| EngineError::Validation(format!("delete task failed: {e}")))?;
        slots[slot] = Some(result);
    }

    let results: Vec<DeletionResult> = slots.into_iter().flatten().collect();
    debug!(
        "deletion batch done: {} ok, {} failed",
        results.iter().filter(|r| r.success).count(),
        results.iter().filter(|r| !r.success).count()
    );
    Ok(BatchReport { results })
}

async fn delete_entry<C>(
    client: &C,
    entry: SelectionEntry,
    retries: u32,
    retry_delay: std::time::Duration,
) -> DeletionResult
where
    C: TrackerClient + ?Sized,
{
    let comment_id = if entry.is_comment_attachment {
        entry.comment_id
    } else {
        None
    };

    let mut attempt = 0;
    loop {
        match client
            .delete_attachment(entry.key.issue_id, entry.key.attachment_id, comment_id)
            .await
        {
            Ok(()) => {
                debug!(
                    issue_key = %entry.issue_key,
                    file = %entry.file_name,
                    "deleted attachment"
                );
                return DeletionResult::ok(entry);
            }
            Err(e) if should_retry(&e, attempt, retries) => {
                attempt += 1;
                warn!(
                    issue_key = %entry.issue_key,
                    file = %entry.file_name,
                    attempt,
                    "delete failed, retrying: {e}"
                );
                tokio::time::sleep(retry_delay).await;
            }
            Err(e) => {
                warn!(
                    issue_key = %entry.issue_key,
                    file = %entry.file_name,
                    "delete failed: {e}"
                );
                return DeletionResult::failed(entry, e.to_string());
            }
        }
    }
}

fn should_retry(error: &ClientError, attempt: u32, retries: u32) -> bool {
    error.is_retryable() && attempt < retries
}
