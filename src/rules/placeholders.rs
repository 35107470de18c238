//! Ordinal placeholder check.
//!
//! Values use `{<digits>}` tokens that are substituted at lookup time. A
//! translation must use exactly the same multiset of tokens as the
//! default-locale value; every discrepancy is reported individually rather
//! than stopping at the first one.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::issues::PlaceholderError;

static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\d+\}").unwrap());

/// Compare the placeholder tokens of a translation against the default value.
///
/// Returns one error per offending token: unknown tokens (present only in the
/// translation), under-used tokens (fewer uses than the default), and
/// over-used tokens (more uses than the default).
pub fn check_placeholders(def: &str, custom: &str) -> Vec<PlaceholderError> {
    // Signed balance per token: default uses add, translation uses subtract.
    let mut balance: HashMap<&str, i64> = HashMap::new();
    let mut token_order: Vec<&str> = Vec::new();

    for m in PLACEHOLDER_REGEX.find_iter(def) {
        let token = m.as_str();
        if !balance.contains_key(token) {
            token_order.push(token);
        }
        *balance.entry(token).or_insert(0) += 1;
    }

    let mut errors = Vec::new();
    for m in PLACEHOLDER_REGEX.find_iter(custom) {
        let token = m.as_str();
        match balance.get_mut(token) {
            Some(count) => *count -= 1,
            None => {
                let error = PlaceholderError::Unknown {
                    token: token.to_string(),
                };
                if !errors.contains(&error) {
                    errors.push(error);
                }
            }
        }
    }

    for token in token_order {
        match balance[token] {
            count if count > 0 => errors.push(PlaceholderError::UnderUsed {
                token: token.to_string(),
                missing: count as usize,
            }),
            count if count < 0 => errors.push(PlaceholderError::OverUsed {
                token: token.to_string(),
                extra: (-count) as usize,
            }),
            _ => {}
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_matching_placeholders() {
        assert!(check_placeholders("hi {0}", "salut {0}").is_empty());
        assert!(check_placeholders("{0} and {1}", "{1} et {0}").is_empty());
        assert!(check_placeholders("no tokens", "sans jetons").is_empty());
    }

    #[test]
    fn test_unknown_token() {
        let errors = check_placeholders("hi there", "salut {0}");
        assert_eq!(
            errors,
            vec![PlaceholderError::Unknown {
                token: "{0}".to_string()
            }]
        );
    }

    #[test]
    fn test_unknown_token_reported_once() {
        let errors = check_placeholders("hi", "{0} {0} {0}");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_under_and_over_used_reported_together() {
        // Default uses {0} and {1}; translation uses {0} twice. Both the
        // missing {1} and the extra {0} must be reported, separately.
        let errors = check_placeholders("{0}{1}", "{0}{0}");
        assert_eq!(
            errors,
            vec![
                PlaceholderError::OverUsed {
                    token: "{0}".to_string(),
                    extra: 1
                },
                PlaceholderError::UnderUsed {
                    token: "{1}".to_string(),
                    missing: 1
                },
            ]
        );
    }

    #[test]
    fn test_repeated_token_counts() {
        assert!(check_placeholders("{0} {0}", "{0}{0}").is_empty());
        let errors = check_placeholders("{0} {0}", "{0}");
        assert_eq!(
            errors,
            vec![PlaceholderError::UnderUsed {
                token: "{0}".to_string(),
                missing: 1
            }]
        );
    }

    #[test]
    fn test_non_ordinal_braces_ignored() {
        // Only {<digits>} is a placeholder; named braces are plain text.
        assert!(check_placeholders("hi {name}", "salut").is_empty());
    }
}
