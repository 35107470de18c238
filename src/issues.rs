//! Consistency violation types reported by the `check` command.
//!
//! A violation never aborts a check run: the validator accumulates every
//! finding across all entries and locales, reports them in full, and the run
//! fails only if the final count is non-zero.

use std::fmt;

/// One failed cross-locale consistency check for a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Entry is stored under a key that differs from its own trigger field.
    /// Fatal for that entry; remaining checks are skipped.
    TriggerMismatch {
        locale: String,
        key: String,
        trigger: String,
    },
    /// Entry id differs from the default locale's id for the same trigger.
    /// The two entries are different logical strings; remaining checks are
    /// skipped.
    IdMismatch {
        locale: String,
        trigger: String,
        expected: u32,
        found: u32,
    },
    /// Placeholder multiset mismatch against the default-locale value.
    Placeholder {
        locale: String,
        trigger: String,
        error: PlaceholderError,
    },
    /// Markup errors in the translation beyond those already present in the
    /// default-locale value.
    Markup {
        locale: String,
        trigger: String,
        residual: usize,
    },
    /// Marker symbol count differs from the default-locale value.
    SymbolCount {
        locale: String,
        trigger: String,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::TriggerMismatch {
                locale,
                key,
                trigger,
            } => write!(
                f,
                "{}: '{}' stored under mismatched key (trigger is '{}')",
                locale, key, trigger
            ),
            Violation::IdMismatch {
                locale,
                trigger,
                expected,
                found,
            } => write!(
                f,
                "{}: '{}' has id {} but the default locale has id {}",
                locale, trigger, found, expected
            ),
            Violation::Placeholder {
                locale,
                trigger,
                error,
            } => write!(f, "{}: '{}' placeholder mismatch: {}", locale, trigger, error),
            Violation::Markup {
                locale,
                trigger,
                residual,
            } => write!(
                f,
                "{}: '{}' has {} markup error(s) not present in the default locale",
                locale, trigger, residual
            ),
            Violation::SymbolCount {
                locale,
                trigger,
                expected,
                found,
            } => write!(
                f,
                "{}: '{}' has {} marker symbol(s), expected {}",
                locale, trigger, found, expected
            ),
        }
    }
}

/// One placeholder token discrepancy between a default value and a
/// translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderError {
    /// Token appears in the translation but not in the default value.
    Unknown { token: String },
    /// Token appears fewer times in the translation than in the default.
    UnderUsed { token: String, missing: usize },
    /// Token appears more times in the translation than in the default.
    OverUsed { token: String, extra: usize },
}

impl fmt::Display for PlaceholderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceholderError::Unknown { token } => {
                write!(f, "unknown placeholder {} in translation", token)
            }
            PlaceholderError::UnderUsed { token, missing } => {
                write!(f, "{} missing use(s) of {}", missing, token)
            }
            PlaceholderError::OverUsed { token, extra } => {
                write!(f, "{} extra use(s) of {}", extra, token)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_display() {
        let v = Violation::IdMismatch {
            locale: "fr".to_string(),
            trigger: "src/app:3".to_string(),
            expected: 3,
            found: 7,
        };
        assert_eq!(
            v.to_string(),
            "fr: 'src/app:3' has id 7 but the default locale has id 3"
        );
    }

    #[test]
    fn test_placeholder_error_display() {
        let e = PlaceholderError::UnderUsed {
            token: "{1}".to_string(),
            missing: 1,
        };
        assert_eq!(e.to_string(), "1 missing use(s) of {1}");
    }
}
