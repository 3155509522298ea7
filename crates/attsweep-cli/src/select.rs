use anyhow::{anyhow, Result};
use attsweep_core::SelectionKey;

/// Parse a `--key ISSUEID:ATTACHMENTID` argument.
pub fn parse_selection_key(raw: &str) -> Result<SelectionKey> {
    let (issue, attachment) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("expected ISSUEID:ATTACHMENTID, got {raw:?}"))?;
    let issue_id: u64 = issue
        .trim()
        .parse()
        .map_err(|_| anyhow!("issue id is not a number in {raw:?}"))?;
    let attachment_id: u64 = attachment
        .trim()
        .parse()
        .map_err(|_| anyhow!("attachment id is not a number in {raw:?}"))?;
    Ok(SelectionKey::new(issue_id, attachment_id))
}

/// Only an explicit yes proceeds.
pub fn is_confirmation(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_keys() {
        let key = parse_selection_key("12:34").unwrap();
        assert_eq!(key, SelectionKey::new(12, 34));
        assert_eq!(
            parse_selection_key(" 5 : 6 ").unwrap(),
            SelectionKey::new(5, 6)
        );
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(parse_selection_key("12").is_err());
        assert!(parse_selection_key("a:34").is_err());
        assert!(parse_selection_key("12:b").is_err());
        assert!(parse_selection_key(":").is_err());
    }

    #[test]
    fn confirmation_requires_explicit_yes() {
        assert!(is_confirmation("y"));
        assert!(is_confirmation("YES\n"));
        assert!(!is_confirmation(""));
        assert!(!is_confirmation("n"));
        assert!(!is_confirmation("yeah"));
    }
}
