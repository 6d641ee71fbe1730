//! Text formatting rules shared by every layout.

pub const PRESENT: &str = "Present";

/// Splits free text into bullet lines: one per line break, leading `- `
/// marker removed, blank lines dropped.
pub fn bullet_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            let line = line.trim();
            if line == "-" {
                return "";
            }
            line.strip_prefix("- ").unwrap_or(line).trim()
        })
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// `"start - end"`, with "Present" replacing the end date of a current entry.
/// Returns `None` when there is nothing to show.
pub fn date_range(start: &str, end: &str, is_current: bool) -> Option<String> {
    let start = start.trim();
    let end = if is_current { PRESENT } else { end.trim() };
    match (start.is_empty(), end.is_empty()) {
        (true, true) => None,
        (false, true) => Some(start.to_string()),
        (true, false) => Some(end.to_string()),
        (false, false) => Some(format!("{start} - {end}")),
    }
}

/// Prefixes `https://` unless the link already names a scheme.
pub fn with_scheme(link: &str) -> String {
    let link = link.trim();
    let lower = link.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("mailto:")
    {
        link.to_string()
    } else {
        format!("https://{link}")
    }
}

/// Trimmed text, or `None` if blank.
pub fn non_blank(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullet_lines_strip_markers() {
        let text = "- Led migration\n\n-  Cut costs 30%\r\nMentored two engineers\n- ";
        assert_eq!(
            bullet_lines(text),
            vec!["Led migration", "Cut costs 30%", "Mentored two engineers"]
        );
    }

    #[test]
    fn test_bullet_lines_keep_inner_dashes() {
        assert_eq!(
            bullet_lines("Built a real-time - ish cache"),
            vec!["Built a real-time - ish cache"]
        );
    }

    #[test]
    fn test_date_range_current_shows_present() {
        assert_eq!(
            date_range("2021-03", "2024-01", true).as_deref(),
            Some("2021-03 - Present")
        );
        assert_eq!(
            date_range("2021-03", "2024-01", false).as_deref(),
            Some("2021-03 - 2024-01")
        );
    }

    #[test]
    fn test_date_range_partial() {
        assert_eq!(date_range("", "", false), None);
        assert_eq!(date_range("2020", "", false).as_deref(), Some("2020"));
        assert_eq!(date_range("", "", true).as_deref(), Some("Present"));
    }

    #[test]
    fn test_with_scheme() {
        assert_eq!(with_scheme("github.com/ada"), "https://github.com/ada");
        assert_eq!(with_scheme("http://ada.dev"), "http://ada.dev");
        assert_eq!(with_scheme("HTTPS://ada.dev"), "HTTPS://ada.dev");
    }
}
