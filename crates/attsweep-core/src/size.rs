/// Format an optional byte count into a human-readable string.
/// The remote omits sizes for some attachments; those render "Unknown".
pub fn format_size(bytes: Option<u64>) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    let Some(bytes) = bytes else {
        return "Unknown".to_string();
    };

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Truncate a comment body to at most 50 characters for display,
/// appending an ellipsis marker only when something was cut.
pub fn comment_excerpt(content: &str) -> String {
    const MAX_CHARS: usize = 50;

    if content.chars().count() <= MAX_CHARS {
        content.to_string()
    } else {
        let mut out: String = content.chars().take(MAX_CHARS).collect();
        out.push_str("...");
        out
    }
}
