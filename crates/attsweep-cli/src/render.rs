use std::fmt::Write;

use attsweep_core::{format_size, Issue, Stats};
use attsweep_engine::BatchReport;

/// One line per attachment, grouped under its issue. The first column
/// is the `ISSUEID:ATTACHMENTID` pair accepted by `sweep --key`.
pub fn render_catalog(catalog: &[Issue]) -> String {
    let mut out = String::new();
    for issue in catalog {
        let _ = writeln!(out, "{}  {}", issue.issue_key, issue.summary);
        for a in &issue.attachments {
            let _ = write!(
                out,
                "  {}:{}  {}  {}  {}",
                a.issue_id,
                a.id,
                a.name,
                format_size(a.size),
                a.created.format("%Y-%m-%d")
            );
            if a.is_comment_attachment {
                match a.comment_excerpt.as_deref() {
                    Some(excerpt) => {
                        let _ = write!(out, "  [comment] {excerpt}");
                    }
                    None => {
                        let _ = write!(out, "  [comment]");
                    }
                }
            }
            let _ = writeln!(out);
        }
    }
    out
}

pub fn render_stats(stats: &Stats) -> String {
    format!(
        "{} issues, {} attachments, {} total, {} selected",
        stats.total_issues,
        stats.total_attachments,
        format_size(Some(stats.total_size)),
        stats.selected_count
    )
}

/// Failure detail lines first, then the one-line tally.
pub fn render_report(report: &BatchReport) -> String {
    let mut out = String::new();
    for failure in report.failures() {
        let _ = writeln!(
            out,
            "failed: {} {} ({})",
            failure.entry.issue_key,
            failure.entry.file_name,
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }
    let _ = writeln!(
        out,
        "{} deleted, {} failed",
        report.success_count(),
        report.failure_count()
    );
    out
}
