use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::attachment::Attachment;
use crate::issue::Issue;

/// Composite identity of one attachment across the whole catalog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SelectionKey {
    pub issue_id: u64,
    pub attachment_id: u64,
}

impl SelectionKey {
    pub fn new(issue_id: u64, attachment_id: u64) -> Self {
        Self {
            issue_id,
            attachment_id,
        }
    }
}

/// One marked attachment, denormalized so deletion and reporting do not
/// need to re-resolve against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub key: SelectionKey,
    pub issue_key: String,
    pub file_name: String,
    pub is_comment_attachment: bool,
    pub comment_id: Option<u64>,
}

impl SelectionEntry {
    pub fn from_attachment(issue: &Issue, attachment: &Attachment) -> Self {
        Self {
            key: SelectionKey::new(issue.id, attachment.id),
            issue_key: issue.issue_key.clone(),
            file_name: attachment.name.clone(),
            is_comment_attachment: attachment.is_comment_attachment,
            comment_id: attachment.comment_id,
        }
    }
}

/// Outcome of one delete request within a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionResult {
    pub entry: SelectionEntry,
    pub success: bool,
    pub error: Option<String>,
}

impl DeletionResult {
    pub fn ok(entry: SelectionEntry) -> Self {
        Self {
            entry,
            success: true,
            error: None,
        }
    }

    pub fn failed(entry: SelectionEntry, error: impl Into<String>) -> Self {
        Self {
            entry,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// The set of attachments marked for deletion. Pure in-memory state;
/// mutated only through its own methods.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    entries: HashMap<SelectionKey, SelectionEntry>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the key if it is already marked, otherwise insert the
    /// entry. Two identical toggles are a no-op.
    pub fn toggle(&mut self, entry: SelectionEntry) {
        if self.entries.remove(&entry.key).is_none() {
            self.entries.insert(entry.key, entry);
        }
    }

    /// Empty selection selects every attachment in the catalog; any
    /// non-empty selection clears entirely. There is no partial
    /// "select remaining" mode.
    pub fn toggle_all(&mut self, catalog: &[Issue]) {
        if self.entries.is_empty() {
            for issue in catalog {
                for attachment in &issue.attachments {
                    let entry = SelectionEntry::from_attachment(issue, attachment);
                    self.entries.insert(entry.key, entry);
                }
            }
        } else {
            self.entries.clear();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_selected(&self, key: SelectionKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the marked entries, sorted by key so callers iterate
    /// deterministically.
    pub fn entries(&self) -> Vec<SelectionEntry> {
        let mut out: Vec<SelectionEntry> = self.entries.values().cloned().collect();
        out.sort_by_key(|e| e.key);
        out
    }
}
