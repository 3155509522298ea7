use attsweep_client::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Missing required input. Rejected before any network call.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Malformed issue-key range. Rejected before any network call.
    #[error("invalid issue key range: {0}")]
    Range(String),

    /// A remote call failed while working on a specific issue.
    #[error("remote call failed for {issue_key}: {source}")]
    Remote {
        issue_key: String,
        source: ClientError,
    },

    /// A remote call failed before any issue context existed
    /// (connection test, project or issue listing).
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("operation cancelled")]
    Cancelled,
}
