use serde::{Deserialize, Serialize};

use crate::issue::Issue;
use crate::selection::SelectionSet;

/// Aggregate counters over one catalog snapshot and the current
/// selection. Derived state: recomputed wholesale on every change,
/// never patched incrementally and never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_issues: usize,
    pub total_attachments: usize,
    pub total_size: u64,
    pub selected_count: usize,
}

/// Pure function of (catalog, selection). Unknown attachment sizes
/// count as zero.
pub fn compute_stats(catalog: &[Issue], selection: &SelectionSet) -> Stats {
    let total_attachments = catalog.iter().map(|i| i.attachments.len()).sum();
    let total_size = catalog
        .iter()
        .flat_map(|i| &i.attachments)
        .map(|a| a.size.unwrap_or(0))
        .sum();
    Stats {
        total_issues: catalog.len(),
        total_attachments,
        total_size,
        selected_count: selection.len(),
    }
}
