use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file bound to an issue, either directly or via a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: u64,
    pub issue_id: u64,
    pub name: String,
    /// The remote does not report a size for every attachment.
    /// `None` counts as zero in aggregate statistics.
    pub size: Option<u64>,
    pub created: DateTime<Utc>,
    pub is_comment_attachment: bool,
    pub comment_id: Option<u64>,
    /// Short excerpt of the owning comment, display only.
    pub comment_excerpt: Option<String>,
}
