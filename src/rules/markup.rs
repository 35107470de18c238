//! Inline markup validation against a fixed allow-list of tags.
//!
//! Translations may carry a small subset of inline HTML. A translation is
//! only reported when it introduces markup errors that the default-locale
//! value does not already have: per error kind, counts covered by the default
//! value are treated as pre-existing and suppressed.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Tags permitted inside translated values, with their allowed attributes.
const ALLOWED_TAGS: &[(&str, &[&str])] = &[
    ("b", &[]),
    ("strong", &[]),
    ("i", &[]),
    ("em", &[]),
    ("u", &[]),
    ("ins", &[]),
    ("s", &[]),
    ("strike", &[]),
    ("del", &[]),
    ("a", &["href"]),
    ("code", &["class"]),
    ("pre", &[]),
];

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)([^<>]*?)(/?)>").unwrap());

static ATTR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([a-zA-Z][a-zA-Z0-9-]*)(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s]+))?"#).unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkupErrorKind {
    /// Tag name is not in the allow-list.
    UnknownTag,
    /// Attribute is not permitted on this tag.
    BadAttribute,
    /// Opening tag without a matching closing tag.
    UnclosedTag,
    /// Closing tag without a matching opening tag.
    StrayClosingTag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupError {
    pub kind: MarkupErrorKind,
    pub tag: String,
}

fn allowed_attrs(tag: &str) -> Option<&'static [&'static str]> {
    ALLOWED_TAGS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, attrs)| *attrs)
}

/// Validate one string against the allow-list. All errors are collected.
pub fn validate(value: &str) -> Vec<MarkupError> {
    let mut errors = Vec::new();
    let mut open_stack: Vec<String> = Vec::new();

    for caps in TAG_REGEX.captures_iter(value) {
        let closing = !caps[1].is_empty();
        let self_closing = !caps[4].is_empty();
        let tag = caps[2].to_ascii_lowercase();
        let attrs_raw = caps[3].trim();

        let Some(attrs) = allowed_attrs(&tag) else {
            errors.push(MarkupError {
                kind: MarkupErrorKind::UnknownTag,
                tag,
            });
            continue;
        };

        if closing {
            match open_stack.iter().rposition(|open| *open == tag) {
                Some(pos) => {
                    // Everything opened above the match was never closed.
                    for skipped in open_stack.drain(pos + 1..) {
                        errors.push(MarkupError {
                            kind: MarkupErrorKind::UnclosedTag,
                            tag: skipped,
                        });
                    }
                    open_stack.pop();
                }
                None => errors.push(MarkupError {
                    kind: MarkupErrorKind::StrayClosingTag,
                    tag,
                }),
            }
            continue;
        }

        for attr_caps in ATTR_REGEX.captures_iter(attrs_raw) {
            let attr = attr_caps[1].to_ascii_lowercase();
            if !attrs.contains(&attr.as_str()) {
                errors.push(MarkupError {
                    kind: MarkupErrorKind::BadAttribute,
                    tag: tag.clone(),
                });
            }
        }

        if !self_closing {
            open_stack.push(tag);
        }
    }

    for tag in open_stack {
        errors.push(MarkupError {
            kind: MarkupErrorKind::UnclosedTag,
            tag,
        });
    }

    errors
}

/// Validate a translation, suppressing error kinds the default value already
/// exhibits in at least equal count. Returns the residual error count.
pub fn check_markup(def: &str, custom: &str) -> usize {
    let custom_errors = validate(custom);
    if custom_errors.is_empty() {
        return 0;
    }

    let mut def_counts: HashMap<MarkupErrorKind, usize> = HashMap::new();
    for error in validate(def) {
        *def_counts.entry(error.kind).or_insert(0) += 1;
    }

    let mut custom_counts: HashMap<MarkupErrorKind, usize> = HashMap::new();
    for error in custom_errors {
        *custom_counts.entry(error.kind).or_insert(0) += 1;
    }

    custom_counts
        .into_iter()
        .map(|(kind, count)| count.saturating_sub(def_counts.get(&kind).copied().unwrap_or(0)))
        .sum()
}
