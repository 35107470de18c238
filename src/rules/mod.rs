//! Cross-locale consistency validation.
//!
//! Every non-default locale's entries are compared against the default
//! locale's. Checks run independently per entry and never halt the run; the
//! caller reports the accumulated violations and fails the run on a non-zero
//! count.

pub mod markup;
pub mod placeholders;
pub mod symbols;

use log::error;

use crate::issues::Violation;
use crate::store::{Entry, TranslationStore};

use markup::check_markup;
use placeholders::check_placeholders;
use symbols::check_symbols;

/// Validate one locale against the default locale.
///
/// The default locale itself is never checked. All entries are visited even
/// when earlier ones fail; each violation is logged as it is found.
pub fn check_locale(store: &TranslationStore, locale: &str) -> Vec<Violation> {
    let mut violations = Vec::new();
    if locale == store.default_locale() {
        return violations;
    }

    for (module, data) in store.modules(locale) {
        for key in &data.order {
            let Some(entry) = data.entries.get(key) else {
                continue;
            };
            check_entry(store, locale, module, key, entry, &mut violations);
        }
    }

    for violation in &violations {
        error!("{}", violation);
    }
    violations
}

/// Validate every loaded non-default locale.
pub fn check_all(store: &TranslationStore) -> Vec<Violation> {
    let mut violations = Vec::new();
    for locale in store.locales() {
        if locale != store.default_locale() {
            violations.extend(check_locale(store, &locale));
        }
    }
    violations
}

fn check_entry(
    store: &TranslationStore,
    locale: &str,
    module: &str,
    key: &str,
    entry: &Entry,
    violations: &mut Vec<Violation>,
) {
    if key != entry.trigger {
        violations.push(Violation::TriggerMismatch {
            locale: locale.to_string(),
            key: key.to_string(),
            trigger: entry.trigger.clone(),
        });
        return;
    }

    // A missing default entry compares as the zero entry, which surfaces as
    // an id mismatch below unless the ids happen to agree at zero.
    let default = store
        .entry(store.default_locale(), module, key)
        .cloned()
        .unwrap_or_default();

    if default.id != entry.id {
        violations.push(Violation::IdMismatch {
            locale: locale.to_string(),
            trigger: key.to_string(),
            expected: default.id,
            found: entry.id,
        });
        return;
    }

    // An empty value means "untranslated, fall back"; there is nothing to
    // compare yet.
    if entry.value.is_empty() || default.value == entry.value {
        return;
    }

    for error in check_placeholders(&default.value, &entry.value) {
        violations.push(Violation::Placeholder {
            locale: locale.to_string(),
            trigger: key.to_string(),
            error,
        });
    }

    let residual = check_markup(&default.value, &entry.value);
    if residual > 0 {
        violations.push(Violation::Markup {
            locale: locale.to_string(),
            trigger: key.to_string(),
            residual,
        });
    }

    if let Some((expected, found)) = check_symbols(&default.value, &entry.value) {
        violations.push(Violation::SymbolCount {
            locale: locale.to_string(),
            trigger: key.to_string(),
            expected,
            found,
        });
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::issues::PlaceholderError;

    fn store_with(
        entries: &[(&str, &str, u32, &str)], // (locale, trigger, id, value)
    ) -> TranslationStore {
        let dir = tempdir().unwrap();
        let mut store = TranslationStore::new(dir.path().to_path_buf(), "en-US".to_string());
        for (locale, trigger, id, value) in entries {
            store.insert_for_tests(
                locale,
                Entry {
                    id: *id,
                    trigger: trigger.to_string(),
                    value: value.to_string(),
                    comment: String::new(),
                },
            );
        }
        store
    }

    #[test]
    fn test_default_locale_never_checked() {
        let store = store_with(&[("en-US", "app:1", 1, "hi {0}")]);
        assert!(check_locale(&store, "en-US").is_empty());
    }

    #[test]
    fn test_equal_values_skip_all_checks() {
        let store = store_with(&[
            ("en-US", "app:1", 1, "<b>broken @"),
            ("fr", "app:1", 1, "<b>broken @"),
        ]);
        assert!(check_locale(&store, "fr").is_empty());
    }

    #[test]
    fn test_untranslated_entries_skipped() {
        let store = store_with(&[
            ("en-US", "app:1", 1, "hi {0}"),
            ("fr", "app:1", 1, ""),
        ]);
        assert!(check_locale(&store, "fr").is_empty());
    }

    #[test]
    fn test_id_mismatch_skips_remaining_checks() {
        let store = store_with(&[
            ("en-US", "app:1", 1, "hi {0}"),
            ("fr", "app:1", 2, "salut"),
        ]);
        let violations = check_locale(&store, "fr");
        assert_eq!(
            violations,
            vec![Violation::IdMismatch {
                locale: "fr".to_string(),
                trigger: "app:1".to_string(),
                expected: 1,
                found: 2,
            }]
        );
    }

    #[test]
    fn test_placeholder_violations_accumulate() {
        let store = store_with(&[
            ("en-US", "app:1", 1, "{0}{1}"),
            ("fr", "app:1", 1, "{0}{0}"),
        ]);
        let violations = check_locale(&store, "fr");
        assert_eq!(violations.len(), 2);
        assert!(matches!(
            &violations[0],
            Violation::Placeholder {
                error: PlaceholderError::OverUsed { .. },
                ..
            }
        ));
        assert!(matches!(
            &violations[1],
            Violation::Placeholder {
                error: PlaceholderError::UnderUsed { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_markup_and_symbols_reported_independently() {
        let store = store_with(&[
            ("en-US", "app:1", 1, "ping @user"),
            ("fr", "app:1", 1, "<blink>pong</blink> user"),
        ]);
        let violations = check_locale(&store, "fr");
        assert_eq!(violations.len(), 2);
        assert!(matches!(violations[0], Violation::Markup { residual: 2, .. }));
        assert!(matches!(
            violations[1],
            Violation::SymbolCount {
                expected: 1,
                found: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_check_all_covers_every_locale() {
        let store = store_with(&[
            ("en-US", "app:1", 1, "hi {0}"),
            ("fr", "app:1", 1, "salut"),
            ("de", "app:1", 1, "hallo"),
        ]);
        let violations = check_all(&store);
        assert_eq!(violations.len(), 2);
    }
}
