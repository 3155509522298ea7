use serde::{Deserialize, Serialize};

use crate::attachment::Attachment;

/// One issue in a catalog snapshot. Only issues with at least one
/// attachment make it into a catalog; a new search produces a new set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub issue_key: String,
    pub summary: String,
    pub attachments: Vec<Attachment>,
}
