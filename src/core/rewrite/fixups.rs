//! Structural insertions that accompany call-site rewrites: the runtime
//! import, the module registration call and locale bindings. Only applied
//! when the pass actually rewrote something, so clean units stay untouched.

use super::visitor::{LANG_IDENT, RewriteVisitor};

impl<'a> RewriteVisitor<'a> {
    pub(crate) fn apply_fixups(&mut self) {
        if self.rewrites == 0 {
            return;
        }
        let anchor = self.ensure_runtime_import();
        self.ensure_load_module(anchor);
        self.ensure_top_level_lang(anchor);
        self.insert_lang_bindings();
    }

    /// Insert `import * as i18n from "@tsloc/runtime";` at its sorted place
    /// among the existing imports. Returns the offset where the import block
    /// ends, which anchors the follow-up insertions.
    fn ensure_runtime_import(&mut self) -> usize {
        let anchor = self.imports.last().map(|i| i.end).unwrap_or(0);
        if self.has_runtime_import {
            return anchor;
        }

        let decl = format!(
            "import * as {} from \"{}\";",
            self.config.runtime_ident, self.config.runtime_package
        );
        let follower = self
            .imports
            .iter()
            .find(|i| i.src.as_str() > self.config.runtime_package.as_str())
            .map(|i| self.line_start(i.start));
        match follower {
            Some(line_start) => self.patches.insert(line_start, format!("{}\n", decl)),
            None => match self.imports.last() {
                Some(last) => self.patches.insert(last.end, format!("\n{}", decl)),
                None => self.patches.insert(0, format!("{}\n", decl)),
            },
        }
        anchor
    }

    /// Insert `i18n.loadModule("<module>");` after the import block unless
    /// the unit already registers itself.
    fn ensure_load_module(&mut self, anchor: usize) {
        if self.has_load_module {
            return;
        }
        let call = format!(
            "{}.loadModule(\"{}\");",
            self.config.runtime_ident, self.module_id
        );
        if self.imports.is_empty() {
            self.patches.insert(anchor, format!("\n{}\n", call));
        } else {
            self.patches.insert(anchor, format!("\n\n{}", call));
        }
    }

    /// Bind the locale at module scope for rewrites outside any function
    /// body.
    fn ensure_top_level_lang(&mut self, anchor: usize) {
        if !self.needs_top_level_lang || self.has_top_level_lang {
            return;
        }
        let binding = format!("const {} = {};", LANG_IDENT, self.config.locale_resolver);
        if self.imports.is_empty() {
            self.patches.insert(anchor, format!("{}\n", binding));
        } else {
            self.patches.insert(anchor, format!("\n{}", binding));
        }
    }

    /// Bind the locale as the first statement of every function body that
    /// gained a rewritten call and does not already bind it.
    fn insert_lang_bindings(&mut self) {
        let targets = std::mem::take(&mut self.lang_targets);
        for target in targets {
            self.patches.insert(
                target.insert_at,
                format!(
                    "\n{}const {} = {};",
                    target.indent, LANG_IDENT, self.config.locale_resolver
                ),
            );
        }
    }
}
