//! Character-based text helpers mirroring LEFT, RIGHT, MID, FIND and LEN.
//!
//! All counts are in characters, not bytes, so names with accents slice the
//! same way a spreadsheet would.

use serde::Serialize;

/// First `n` characters; the whole string when it is shorter.
pub fn left(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Last `n` characters; the whole string when it is shorter.
pub fn right(s: &str, n: usize) -> String {
    let len = len(s);
    s.chars().skip(len.saturating_sub(n)).collect()
}

/// `n` characters starting at 1-based `start`.
pub fn mid(s: &str, start: usize, n: usize) -> String {
    s.chars().skip(start.saturating_sub(1)).take(n).collect()
}

/// 1-based character position of the first occurrence of `needle`.
pub fn find(needle: &str, haystack: &str) -> Option<usize> {
    haystack
        .find(needle)
        .map(|byte_idx| haystack[..byte_idx].chars().count() + 1)
}

pub fn len(s: &str) -> usize {
    s.chars().count()
}

/// Result of splitting a name at its first space.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SpaceSplit {
    pub first: String,
    /// `None` when the text has no space at all.
    pub rest: Option<String>,
}

pub fn split_first_space(s: &str) -> SpaceSplit {
    let trimmed = s.trim();
    match trimmed.split_once(' ') {
        Some((first, rest)) => SpaceSplit {
            first: first.to_string(),
            rest: Some(rest.trim_start().to_string()),
        },
        None => SpaceSplit {
            first: trimmed.to_string(),
            rest: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_never_fail_on_short_text() {
        assert_eq!(left("Cher", 3), "Che");
        assert_eq!(right("Cher", 5), "Cher");
        assert_eq!(left("", 3), "");
        assert_eq!(mid("Olivia Chen", 8, 10), "Chen");
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(right("José Núñez", 5), "Núñez");
        assert_eq!(find(" ", "José Núñez"), Some(5));
        assert_eq!(len("Núñez"), 5);
    }

    #[test]
    fn split_reports_missing_space() {
        let split = split_first_space("Liam Patel");
        assert_eq!(split.first, "Liam");
        assert_eq!(split.rest.as_deref(), Some("Patel"));
        assert_eq!(split_first_space(" Cher ").rest, None);
    }
}
