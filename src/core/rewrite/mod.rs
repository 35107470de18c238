//! Source rewriting pipeline for `extract`.

mod fixups;
pub mod patch;
mod visitor;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use swc_common::SourceMap;
use swc_ecma_visit::Visit;

pub use visitor::LANG_IDENT;

use crate::config::Config;
use crate::core::parser::parse_unit;
use crate::store::{ModuleRewrite, TranslationStore};

use visitor::RewriteVisitor;

/// Outcome of rewriting one source unit.
pub struct UnitRewrite {
    /// Full unit text with all patches applied.
    pub output: String,
    /// Whether the text differs from the input.
    pub changed: bool,
    /// Whether the unit contained any extraction or lookup site.
    pub touched: bool,
    /// The module's refreshed entry set, ready to flush.
    pub module_rewrite: ModuleRewrite,
}

/// Rewrite one unit against the store.
///
/// Loads the unit's module records for every locale first, so existing
/// translations are carried and ids continue from the persisted counter. The
/// store is only mutated through id allocation; persisting the refreshed
/// entry set is the caller's decision.
pub fn rewrite_unit(
    path: &Path,
    source: String,
    config: &Config,
    store: &mut TranslationStore,
) -> Result<UnitRewrite> {
    let module_id = TranslationStore::module_id(path);
    store.load_module(&module_id)?;

    let unit = parse_unit(path, source, Arc::new(SourceMap::default()))?;
    let mut visitor = RewriteVisitor::new(&unit, &module_id, config, store);
    visitor.visit_module(&unit.module);
    visitor.apply_fixups();

    let (patches, module_rewrite, rewrites) = visitor.finish();
    let changed = !patches.is_empty();
    let touched = rewrites > 0 || !module_rewrite.is_empty();
    let output = patches.apply(&unit.source);

    Ok(UnitRewrite {
        output,
        changed,
        touched,
        module_rewrite,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;
    use crate::store::Entry;

    fn test_config() -> Config {
        Config {
            funcs: vec!["send".to_string()],
            fmtfuncs: vec!["sendf".to_string()],
            ..Default::default()
        }
    }

    fn rewrite(store: &mut TranslationStore, path: &str, source: &str) -> UnitRewrite {
        rewrite_unit(Path::new(path), source.to_string(), &test_config(), store).unwrap()
    }

    #[test]
    fn test_plain_call_rewritten() {
        let dir = tempdir().unwrap();
        let mut store = TranslationStore::new(dir.path().to_path_buf(), "en-US".to_string());

        let source = "import { bot } from \"./bot\";\n\nfunction greet() {\n    bot.send(\"hello there\");\n}\n";
        let result = rewrite(&mut store, "src/greet.ts", source);

        assert!(result.changed);
        assert!(result.touched);
        assert_eq!(
            result.output,
            "import { bot } from \"./bot\";\n\
             import * as i18n from \"@tsloc/runtime\";\n\
             \n\
             i18n.loadModule(\"src/greet\");\n\
             \n\
             function greet() {\n\
             \x20   const lang = i18n.currentLocale();\n\
             \x20   bot.send(i18n.lookup(lang, \"src/greet:1\"));\n\
             }\n"
        );
        assert_eq!(result.module_rewrite.len(), 1);
    }

    #[test]
    fn test_format_call_rewritten_and_renamed() {
        let dir = tempdir().unwrap();
        let mut store = TranslationStore::new(dir.path().to_path_buf(), "en-US".to_string());

        let source = "function greet(user) {\n    bot.sendf(\"hello {0}\", user.name);\n}\n";
        let result = rewrite(&mut store, "src/greet.ts", source);

        assert!(result.output.contains(
            "bot.send(i18n.lookupFormatted(lang, \"src/greet:1\", { \"0\": user.name }));"
        ));
        assert!(!result.output.contains("sendf"));
    }

    #[test]
    fn test_top_level_call_binds_lang_at_module_scope() {
        let dir = tempdir().unwrap();
        let mut store = TranslationStore::new(dir.path().to_path_buf(), "en-US".to_string());

        let result = rewrite(&mut store, "src/app.ts", "send(\"startup\");\n");
        assert_eq!(
            result.output,
            "import * as i18n from \"@tsloc/runtime\";\n\
             \n\
             i18n.loadModule(\"src/app\");\n\
             const lang = i18n.currentLocale();\n\
             send(i18n.lookup(lang, \"src/app:1\"));\n"
        );
    }

    #[test]
    fn test_second_pass_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut store = TranslationStore::new(dir.path().to_path_buf(), "en-US".to_string());

        let source = "function greet() {\n    bot.send(\"hello\");\n}\n";
        let first = rewrite(&mut store, "src/greet.ts", source);
        store.flush(first.module_rewrite).unwrap();

        let mut store = TranslationStore::new(dir.path().to_path_buf(), "en-US".to_string());
        let second = rewrite(&mut store, "src/greet.ts", &first.output);
        assert!(!second.changed);
        assert!(second.touched);
        assert_eq!(second.output, first.output);
        assert_eq!(second.module_rewrite.len(), 1);
        assert_eq!(store.counter("src/greet"), 1);
    }

    #[test]
    fn test_duplicate_literals_share_a_trigger() {
        let dir = tempdir().unwrap();
        let mut store = TranslationStore::new(dir.path().to_path_buf(), "en-US".to_string());

        let source = "function a() {\n    send(\"same\");\n}\nfunction b() {\n    send(\"same\");\n}\n";
        let result = rewrite(&mut store, "src/app.ts", source);

        assert_eq!(result.output.matches("\"src/app:1\"").count(), 2);
        assert_eq!(result.module_rewrite.len(), 1);
    }

    #[test]
    fn test_unknown_trigger_left_untouched() {
        let dir = tempdir().unwrap();
        let mut store = TranslationStore::new(dir.path().to_path_buf(), "en-US".to_string());

        let source = "function greet() {\n    const lang = i18n.currentLocale();\n    bot.send(i18n.lookup(lang, \"src/greet:9\"));\n}\n";
        let result = rewrite(&mut store, "src/greet.ts", source);
        assert!(!result.changed);
        assert!(!result.touched);
        assert!(result.module_rewrite.is_empty());
    }

    #[test]
    fn test_migrated_duplicates_collapse_onto_one_trigger() {
        let dir = tempdir().unwrap();
        let mut store = TranslationStore::new(dir.path().to_path_buf(), "en-US".to_string());
        for (trigger, id) in [("src/app:1", 1), ("src/app:2", 2)] {
            store.insert_for_tests(
                "en-US",
                Entry {
                    id,
                    trigger: trigger.to_string(),
                    value: "same".to_string(),
                    comment: String::new(),
                },
            );
        }

        let source = "\
function a() {
    const lang = i18n.currentLocale();
    send(i18n.lookup(lang, \"src/app:1\"));
}
function b() {
    const lang = i18n.currentLocale();
    send(i18n.lookup(lang, \"src/app:2\"));
}
";
        let result = rewrite(&mut store, "src/app.ts", source);

        // Both call sites end up on the first trigger seen for the text.
        assert!(result.changed);
        assert_eq!(result.output.matches("\"src/app:1\"").count(), 2);
        assert!(!result.output.contains("src/app:2"));

        store.flush(result.module_rewrite).unwrap();
        assert!(store.entry("en-US", "src/app", "src/app:1").is_some());
        assert!(store.entry("en-US", "src/app", "src/app:2").is_none());
    }

    #[test]
    fn test_register_call_keeps_formatting_arguments() {
        let dir = tempdir().unwrap();
        let mut store = TranslationStore::new(dir.path().to_path_buf(), "en-US".to_string());

        let source = "function greet(user) {\n    i18n.registerUntranslated(\"hi {0}\", user.name);\n}\n";
        let result = rewrite(&mut store, "src/greet.ts", source);

        assert!(result.output.contains(
            "i18n.lookupFormatted(lang, \"src/greet:1\", { \"0\": user.name });"
        ));
        assert!(!result.output.contains("registerUntranslated"));
        assert_eq!(result.module_rewrite.len(), 1);
    }

    #[test]
    fn test_stale_entries_pruned_on_flush() {
        let dir = tempdir().unwrap();
        let mut store = TranslationStore::new(dir.path().to_path_buf(), "en-US".to_string());

        let source = "function a() {\n    send(\"keep\");\n    send(\"drop\");\n}\n";
        let first = rewrite(&mut store, "src/app.ts", source);
        store.flush(first.module_rewrite).unwrap();

        // The "drop" call is deleted; its entry must go, "keep" must stay.
        let trimmed = first.output.replace(
            "    send(i18n.lookup(lang, \"src/app:2\"));\n",
            "",
        );
        let mut store = TranslationStore::new(dir.path().to_path_buf(), "en-US".to_string());
        let second = rewrite(&mut store, "src/app.ts", &trimmed);
        store.flush(second.module_rewrite).unwrap();

        assert!(store.entry("en-US", "src/app", "src/app:1").is_some());
        assert!(store.entry("en-US", "src/app", "src/app:2").is_none());
        assert_eq!(store.counter("src/app"), 2);
    }

    #[test]
    fn test_concatenation_not_extracted() {
        let dir = tempdir().unwrap();
        let mut store = TranslationStore::new(dir.path().to_path_buf(), "en-US".to_string());

        let result = rewrite(&mut store, "src/app.ts", "send(\"a\" + name);\n");
        assert!(!result.changed);
        assert!(result.module_rewrite.is_empty());
    }

    #[test]
    fn test_runtime_import_sorted_before_later_packages() {
        let dir = tempdir().unwrap();
        let mut store = TranslationStore::new(dir.path().to_path_buf(), "en-US".to_string());

        let source = "import x from \"react\";\n\nsend(\"hi\");\n";
        let result = rewrite(&mut store, "src/app.ts", source);
        let import_pos = result.output.find("@tsloc/runtime").unwrap();
        let react_pos = result.output.find("react").unwrap();
        assert!(import_pos < react_pos);
    }
}
