use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::traits::{ClientError, TrackerClient};
use crate::types::{RemoteAttachment, RemoteComment, RemoteIssue, RemoteProject};

/// A mock tracker for testing that serves scripted fixtures, supports
/// per-call failure injection, and tracks call counts. Deletes mutate
/// the fixtures, so a rebuilt catalog reflects them.
pub struct MockClient {
    projects: Vec<RemoteProject>,
    issues: Vec<RemoteIssue>,
    attachments: Mutex<HashMap<u64, Vec<RemoteAttachment>>>,
    comments: Mutex<HashMap<u64, Vec<RemoteComment>>>,
    fail_attachments_for: Option<u64>,
    fail_delete_of: HashSet<u64>,
    rate_limited: Mutex<HashMap<u64, u32>>,
    list_issue_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

/// Fixed base timestamp plus `n` seconds, so fixtures are reproducible
/// and ordered.
pub fn created_at(n: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + chrono::Duration::seconds(n.into())
}

pub fn attachment(id: u64, name: &str, size: Option<u64>) -> RemoteAttachment {
    RemoteAttachment {
        id,
        name: name.to_string(),
        size,
        created: created_at(0),
    }
}

pub fn comment(id: u64, content: &str, attachments: Vec<RemoteAttachment>) -> RemoteComment {
    RemoteComment {
        id,
        content: if content.is_empty() {
            None
        } else {
            Some(content.to_string())
        },
        created: created_at(id as u32),
        attachments,
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            projects: Vec::new(),
            issues: Vec::new(),
            attachments: Mutex::new(HashMap::new()),
            comments: Mutex::new(HashMap::new()),
            fail_attachments_for: None,
            fail_delete_of: HashSet::new(),
            rate_limited: Mutex::new(HashMap::new()),
            list_issue_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_project(mut self, id: u64, project_key: &str, name: &str) -> Self {
        self.projects.push(RemoteProject {
            id,
            project_key: project_key.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn with_issue(mut self, id: u64, issue_key: &str, summary: &str) -> Self {
        self.issues.push(RemoteIssue {
            id,
            issue_key: issue_key.to_string(),
            summary: summary.to_string(),
        });
        self
    }

    pub fn with_attachment(self, issue_id: u64, attachment: RemoteAttachment) -> Self {
        self.attachments
            .lock()
            .unwrap()
            .entry(issue_id)
            .or_default()
            .push(attachment);
        self
    }

    pub fn with_comment(self, issue_id: u64, comment: RemoteComment) -> Self {
        self.comments
            .lock()
            .unwrap()
            .entry(issue_id)
            .or_default()
            .push(comment);
        self
    }

    /// Attachment fetches for this issue fail, aborting catalog builds.
    pub fn with_fail_attachments(mut self, issue_id: u64) -> Self {
        self.fail_attachments_for = Some(issue_id);
        self
    }

    /// Deletes of this attachment always fail with an API error.
    pub fn with_fail_delete(mut self, attachment_id: u64) -> Self {
        self.fail_delete_of.insert(attachment_id);
        self
    }

    /// The first `times` deletes of this attachment answer 429.
    pub fn with_rate_limited_delete(self, attachment_id: u64, times: u32) -> Self {
        self.rate_limited.lock().unwrap().insert(attachment_id, times);
        self
    }

    pub fn list_issue_calls(&self) -> usize {
        self.list_issue_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrackerClient for MockClient {
    async fn test_connection(&self) -> Result<(), ClientError> {
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<RemoteProject>, ClientError> {
        Ok(self.projects.clone())
    }

    async fn list_issues(&self, _project_id: u64) -> Result<Vec<RemoteIssue>, ClientError> {
        self.list_issue_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.issues.clone())
    }

    async fn issue_attachments(
        &self,
        issue_id: u64,
    ) -> Result<Vec<RemoteAttachment>, ClientError> {
        if self.fail_attachments_for == Some(issue_id) {
            return Err(ClientError::Api {
                status: 500,
                message: "mock attachment fetch failure".into(),
            });
        }
        Ok(self
            .attachments
            .lock()
            .unwrap()
            .get(&issue_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn issue_comments(&self, issue_id: u64) -> Result<Vec<RemoteComment>, ClientError> {
        Ok(self
            .comments
            .lock()
            .unwrap()
            .get(&issue_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_attachment(
        &self,
        issue_id: u64,
        attachment_id: u64,
        comment_id: Option<u64>,
    ) -> Result<(), ClientError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(remaining) = self.rate_limited.lock().unwrap().get_mut(&attachment_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ClientError::RateLimited);
            }
        }

        if self.fail_delete_of.contains(&attachment_id) {
            return Err(ClientError::Api {
                status: 500,
                message: "mock delete failure".into(),
            });
        }

        match comment_id {
            Some(comment_id) => {
                let mut comments = self.comments.lock().unwrap();
                let comment = comments
                    .get_mut(&issue_id)
                    .and_then(|list| list.iter_mut().find(|c| c.id == comment_id));
                match comment {
                    Some(comment) => {
                        let before = comment.attachments.len();
                        comment.attachments.retain(|a| a.id != attachment_id);
                        if comment.attachments.len() == before {
                            return Err(not_found(attachment_id));
                        }
                    }
                    None => return Err(not_found(attachment_id)),
                }
            }
            None => {
                let mut attachments = self.attachments.lock().unwrap();
                let list = attachments.entry(issue_id).or_default();
                let before = list.len();
                list.retain(|a| a.id != attachment_id);
                if list.len() == before {
                    return Err(not_found(attachment_id));
                }
            }
        }
        Ok(())
    }
}

fn not_found(attachment_id: u64) -> ClientError {
    ClientError::Api {
        status: 404,
        message: format!("no such attachment: {attachment_id}"),
    }
}
