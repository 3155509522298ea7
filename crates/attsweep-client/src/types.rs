use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProject {
    pub id: u64,
    pub project_key: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteIssue {
    pub id: u64,
    pub issue_key: String,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAttachment {
    pub id: u64,
    pub name: String,
    /// Absent on some trackers for legacy uploads.
    #[serde(default)]
    pub size: Option<u64>,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteComment {
    pub id: u64,
    #[serde(default)]
    pub content: Option<String>,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub attachments: Vec<RemoteAttachment>,
}
