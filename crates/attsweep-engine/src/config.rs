use std::time::Duration;

/// Knobs for the catalog builder and deletion orchestrator. Defaults
/// stay small to respect remote rate limits.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Concurrent per-issue attachment/comment fetches during a
    /// catalog build.
    pub fetch_concurrency: usize,
    /// Concurrent delete requests during a batch.
    pub delete_concurrency: usize,
    /// Retries per delete after a retryable failure (rate limit,
    /// transport error).
    pub delete_retries: u32,
    /// Delay before each delete retry.
    pub retry_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch_concurrency: 4,
            delete_concurrency: 3,
            delete_retries: 1,
            retry_delay: Duration::from_millis(500),
        }
    }
}
