//! Marker symbol count check.
//!
//! `@` marks mention-style templating outside the placeholder syntax; a
//! translation that drops or invents one is almost certainly wrong.

/// The designated marker symbol counted in both strings.
pub const MARKER_SYMBOL: char = '@';

pub fn count_markers(value: &str) -> usize {
    value.chars().filter(|c| *c == MARKER_SYMBOL).count()
}

/// Returns `(expected, found)` when the counts differ.
pub fn check_symbols(def: &str, custom: &str) -> Option<(usize, usize)> {
    let expected = count_markers(def);
    let found = count_markers(custom);
    if expected == found {
        None
    } else {
        Some((expected, found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_counts() {
        assert_eq!(check_symbols("ping @user", "pong @user"), None);
        assert_eq!(check_symbols("no markers", "sans marqueurs"), None);
    }

    #[test]
    fn test_mismatched_counts() {
        assert_eq!(check_symbols("ping @user", "pong user"), Some((1, 0)));
        assert_eq!(check_symbols("plain", "@@"), Some((0, 2)));
    }
}
