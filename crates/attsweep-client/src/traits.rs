use async_trait::async_trait;
use thiserror::Error;

use crate::types::{RemoteAttachment, RemoteComment, RemoteIssue, RemoteProject};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("rate limited by remote")]
    RateLimited,

    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("json decode: {0}")]
    Decode(String),
}

impl ClientError {
    /// Rate limiting and transport-level failures are worth retrying
    /// after a delay; auth and API errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::RateLimited | ClientError::Connection(_))
    }
}

/// Abstraction over the issue tracker's network API.
///
/// The catalog builder and deletion orchestrator program against this
/// trait. `HttpClient` talks to a Backlog-style REST API; `MockClient`
/// serves scripted fixtures for tests.
#[async_trait]
pub trait TrackerClient: Send + Sync {
    /// Verify credentials and reachability without touching any data.
    async fn test_connection(&self) -> Result<(), ClientError>;

    async fn list_projects(&self) -> Result<Vec<RemoteProject>, ClientError>;

    /// All issues of a project, in the remote's creation order.
    /// Pagination is handled inside the implementation.
    async fn list_issues(&self, project_id: u64) -> Result<Vec<RemoteIssue>, ClientError>;

    /// Attachments bound directly to the issue, in retrieval order.
    async fn issue_attachments(
        &self,
        issue_id: u64,
    ) -> Result<Vec<RemoteAttachment>, ClientError>;

    /// All comments on the issue with their embedded attachments.
    async fn issue_comments(&self, issue_id: u64) -> Result<Vec<RemoteComment>, ClientError>;

    /// Delete one attachment. Comment attachments carry the owning
    /// comment id and are routed to the comment-scoped endpoint.
    async fn delete_attachment(
        &self,
        issue_id: u64,
        attachment_id: u64,
        comment_id: Option<u64>,
    ) -> Result<(), ClientError>;
}
