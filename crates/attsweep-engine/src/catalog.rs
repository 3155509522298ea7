use std::sync::Arc;

use attsweep_client::types::{RemoteComment, RemoteIssue};
use attsweep_client::TrackerClient;
use attsweep_core::{comment_excerpt, Attachment, Issue};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::config::EngineConfig;
use crate::error::EngineError;

/// An inclusive issue-key range within one project prefix,
/// e.g. PROJ-10 .. PROJ-25.
#[derive(Debug, Clone, PartialEq, Eq)]
struct KeyRange {
    prefix: String,
    from: u64,
    to: u64,
}

impl KeyRange {
    fn contains(&self, issue_key: &str) -> bool {
        match parse_issue_key(issue_key) {
            Some((prefix, number)) => {
                prefix == self.prefix && number >= self.from && number <= self.to
            }
            None => false,
        }
    }
}

fn parse_issue_key(key: &str) -> Option<(&str, u64)> {
    let (prefix, number) = key.rsplit_once('-')?;
    if prefix.is_empty() {
        return None;
    }
    let number: u64 = number.parse().ok()?;
    Some((prefix, number))
}

/// Both sides are trimmed; if either side ends up empty the range is
/// treated as absent (both-or-neither). Malformed keys, mismatched
/// prefixes and inverted bounds are rejected before any network call.
fn resolve_key_range(from: &str, to: &str) -> Result<Option<KeyRange>, EngineError> {
    let from = from.trim();
    let to = to.trim();
    if from.is_empty() || to.is_empty() {
        return Ok(None);
    }

    let (from_prefix, from_number) = parse_issue_key(from)
        .ok_or_else(|| EngineError::Range(format!("malformed issue key: {from}")))?;
    let (to_prefix, to_number) = parse_issue_key(to)
        .ok_or_else(|| EngineError::Range(format!("malformed issue key: {to}")))?;

    if from_prefix != to_prefix {
        return Err(EngineError::Range(format!(
            "range spans different projects: {from} .. {to}"
        )));
    }
    if from_number > to_number {
        return Err(EngineError::Range(format!(
            "range is inverted: {from} .. {to}"
        )));
    }

    Ok(Some(KeyRange {
        prefix: from_prefix.to_string(),
        from: from_number,
        to: to_number,
    }))
}

/// Build a catalog snapshot: every issue of the project (optionally
/// restricted to a key range) that carries at least one attachment,
/// with direct and comment attachments merged per issue.
///
/// Per-issue fetches run concurrently up to `config.fetch_concurrency`,
/// but the output preserves the remote's issue order regardless of
/// completion order. Merge order within an issue: direct attachments in
/// retrieval order, then comment attachments in comment chronological
/// order.
///
/// All-or-nothing: any single fetch failure aborts the whole build, and
/// cancellation discards partial results.
pub async fn build_catalog<C>(
    client: Arc<C>,
    project_id: u64,
    key_range: Option<(&str, &str)>,
    config: &EngineConfig,
    cancel: &CancelToken,
) -> Result<Vec<Issue>, EngineError>
where
    C: TrackerClient + ?Sized + 'static,
{
    if project_id == 0 {
        return Err(EngineError::Validation("no project selected".into()));
    }
    let range = match key_range {
        Some((from, to)) => resolve_key_range(from, to)?,
        None => None,
    };
    if cancel.is_cancelled() {
        return Err(EngineError::Cancelled);
    }

    let issues = client.list_issues(project_id).await?;
    let issues: Vec<RemoteIssue> = match &range {
        Some(range) => issues
            .into_iter()
            .filter(|issue| range.contains(&issue.issue_key))
            .collect(),
        None => issues,
    };
    debug!("catalog build: {} issues to inspect", issues.len());

    let semaphore = Arc::new(Semaphore::new(config.fetch_concurrency.max(1)));
    let mut handles = Vec::with_capacity(issues.len());
    for (slot, issue) in issues.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        let client = client.clone();
        let cancel = cancel.clone();
        handles.push(tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return (slot, Err(EngineError::Cancelled)),
            };
            if cancel.is_cancelled() {
                return (slot, Err(EngineError::Cancelled));
            }
            let merged = fetch_issue(client.as_ref(), &issue).await;
            (slot, merged.map(|attachments| (issue, attachments)))
        }));
    }

    let mut slots: Vec<Option<(RemoteIssue, Vec<Attachment>)>> =
        handles.iter().map(|_| None).collect();
    let mut first_error: Option<EngineError> = None;
    for handle in handles {
        let (slot, fetched) = handle
            .await
            .map_err(|e| EngineError::Validation(format!("fetch task failed: {e}")))?;
        match fetched {
            Ok(merged) => slots[slot] = Some(merged),
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }
    if let Some(e) = first_error {
        return Err(e);
    }

    let catalog: Vec<Issue> = slots
        .into_iter()
        .flatten()
        .filter(|(_, attachments)| !attachments.is_empty())
        .map(|(issue, attachments)| Issue {
            id: issue.id,
            issue_key: issue.issue_key,
            summary: issue.summary,
            attachments,
        })
        .collect();
    debug!("catalog build: {} issues carry attachments", catalog.len());
    Ok(catalog)
}

async fn fetch_issue<C>(
    client: &C,
    issue: &RemoteIssue,
) -> Result<Vec<Attachment>, EngineError>
where
    C: TrackerClient + ?Sized,
{
    let remote_err = |source| EngineError::Remote {
        issue_key: issue.issue_key.clone(),
        source,
    };

    let direct = client.issue_attachments(issue.id).await.map_err(remote_err)?;
    let mut comments = client.issue_comments(issue.id).await.map_err(remote_err)?;
    comments.sort_by_key(|c| c.created);

    let mut merged = Vec::with_capacity(direct.len());
    for attachment in direct {
        merged.push(Attachment {
            id: attachment.id,
            issue_id: issue.id,
            name: attachment.name,
            size: attachment.size,
            created: attachment.created,
            is_comment_attachment: false,
            comment_id: None,
            comment_excerpt: None,
        });
    }
    for comment in comments {
        append_comment_attachments(issue.id, comment, &mut merged);
    }
    Ok(merged)
}

fn append_comment_attachments(issue_id: u64, comment: RemoteComment, out: &mut Vec<Attachment>) {
    let excerpt = comment.content.as_deref().map(comment_excerpt);
    for attachment in comment.attachments {
        out.push(Attachment {
            id: attachment.id,
            issue_id,
            name: attachment.name,
            size: attachment.size,
            created: attachment.created,
            is_comment_attachment: true,
            comment_id: Some(comment.id),
            comment_excerpt: excerpt.clone(),
        });
    }
}
