//! Call-site rewriting.
//!
//! Walks a parsed unit looking for calls to the configured messaging
//! functions whose first argument is a string literal, moves the literal into
//! the translation store under a freshly allocated trigger, and patches the
//! call to fetch the text through the runtime module instead. Calls that are
//! already migrated are re-registered so their entries survive the flush, and
//! duplicate literals collapse onto one trigger.
//!
//! The visitor only records patches; nothing is written until the caller
//! applies them and flushes the store.

use std::collections::HashMap;

use log::{debug, warn};
use swc_common::{Span, Spanned};
use swc_ecma_ast::{
    ArrowExpr, BinaryOp, BlockStmt, BlockStmtOrExpr, CallExpr, Callee, Constructor, Decl, Expr,
    Function, ImportDecl, Lit, MemberProp, Module, ModuleItem, Pat, Stmt, VarDecl,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::config::Config;
use crate::core::parser::ParsedUnit;
use crate::store::{ModuleRewrite, TranslationStore};

use super::patch::PatchSet;

/// Identifier rewritten calls use for the active locale.
pub const LANG_IDENT: &str = "lang";

/// A function body that needs a locale binding inserted after its `{`.
pub(crate) struct LangTarget {
    pub insert_at: usize,
    pub indent: String,
}

pub(crate) struct ImportFact {
    pub src: String,
    pub start: usize,
    pub end: usize,
}

struct FnFrame {
    insert_at: usize,
    indent: String,
    has_lang_binding: bool,
    needs_lang: bool,
}

enum CallKind {
    Plain,
    Format { rename: Option<(Span, String)> },
    Migrated,
    Register,
    LoadModule,
}

pub struct RewriteVisitor<'a> {
    pub(crate) unit: &'a ParsedUnit,
    pub(crate) module_id: &'a str,
    pub(crate) config: &'a Config,
    store: &'a mut TranslationStore,

    pub(crate) patches: PatchSet,
    rewrite: ModuleRewrite,
    pub(crate) rewrites: usize,
    dedup: HashMap<String, String>,

    fn_stack: Vec<FnFrame>,
    pub(crate) lang_targets: Vec<LangTarget>,
    pub(crate) needs_top_level_lang: bool,
    pub(crate) has_top_level_lang: bool,

    pub(crate) imports: Vec<ImportFact>,
    pub(crate) has_runtime_import: bool,
    pub(crate) has_load_module: bool,
}

impl<'a> RewriteVisitor<'a> {
    pub fn new(
        unit: &'a ParsedUnit,
        module_id: &'a str,
        config: &'a Config,
        store: &'a mut TranslationStore,
    ) -> Self {
        Self {
            unit,
            module_id,
            config,
            store,
            patches: PatchSet::new(),
            rewrite: ModuleRewrite::new(module_id.to_string()),
            rewrites: 0,
            dedup: HashMap::new(),
            fn_stack: Vec::new(),
            lang_targets: Vec::new(),
            needs_top_level_lang: false,
            has_top_level_lang: false,
            imports: Vec::new(),
            has_runtime_import: false,
            has_load_module: false,
        }
    }

    pub(crate) fn finish(self) -> (PatchSet, ModuleRewrite, usize) {
        (self.patches, self.rewrite, self.rewrites)
    }

    pub(crate) fn line_start(&self, offset: usize) -> usize {
        self.unit.source[..offset]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    fn line_indent(&self, offset: usize) -> String {
        let start = self.line_start(offset);
        self.unit.source[start..]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect()
    }

    fn classify(&self, node: &CallExpr) -> Option<CallKind> {
        let Callee::Expr(expr) = &node.callee else {
            return None;
        };
        match &**expr {
            Expr::Ident(ident) => self.classify_name(ident.sym.as_str(), ident.span),
            Expr::Member(member) => {
                let MemberProp::Ident(prop) = &member.prop else {
                    return None;
                };
                let name = prop.sym.as_str();
                if let Expr::Ident(obj) = &*member.obj
                    && obj.sym.as_str() == self.config.runtime_ident
                {
                    return match name {
                        "lookup" | "lookupFormatted" => Some(CallKind::Migrated),
                        "registerUntranslated" => Some(CallKind::Register),
                        "loadModule" => Some(CallKind::LoadModule),
                        _ => None,
                    };
                }
                self.classify_name(name, prop.span)
            }
            _ => None,
        }
    }

    fn classify_name(&self, name: &str, span: Span) -> Option<CallKind> {
        if self.config.is_plain_func(name) {
            Some(CallKind::Plain)
        } else if self.config.is_format_func(name) {
            let rename = self
                .config
                .unformat_name(name)
                .map(|plain| (span, plain.to_string()));
            Some(CallKind::Format { rename })
        } else {
            None
        }
    }

    /// First argument as an extractable literal: a plain string or a
    /// substitution-free template.
    fn literal_arg(expr: &Expr) -> Option<(String, Span)> {
        match expr {
            Expr::Lit(Lit::Str(s)) => s.value.as_str().map(|text| (text.to_string(), s.span)),
            Expr::Tpl(tpl) if tpl.exprs.is_empty() => tpl
                .quasis
                .first()
                .and_then(|q| q.cooked.as_ref())
                .and_then(|c| c.as_str())
                .map(|text| (text.to_string(), tpl.span)),
            _ => None,
        }
    }

    fn warn_unextractable(&self, expr: &Expr) {
        let (line, col) = self.unit.line_col(expr.span().lo);
        match expr {
            Expr::Bin(bin) if bin.op == BinaryOp::Add => warn!(
                "{}:{}:{}: concatenated message left as is, join it into one literal",
                self.module_id, line, col
            ),
            Expr::Tpl(_) => warn!(
                "{}:{}:{}: template with substitutions left as is, use a format call",
                self.module_id, line, col
            ),
            _ => debug!(
                "{}:{}:{}: non-literal message argument left as is",
                self.module_id, line, col
            ),
        }
    }

    /// Trigger for a literal, allocating an id on first sight and reusing it
    /// for later duplicates within the unit.
    fn intern(&mut self, text: &str) -> String {
        if let Some(trigger) = self.dedup.get(text) {
            return trigger.clone();
        }
        let id = self.store.next_id(self.module_id);
        let trigger = format!("{}:{}", self.module_id, id);
        self.rewrite.record_new(&*self.store, &trigger, id, text);
        self.dedup.insert(text.to_string(), trigger.clone());
        trigger
    }

    fn lookup_call(&self, trigger: &str) -> String {
        format!(
            "{}.lookup({}, \"{}\")",
            self.config.runtime_ident, LANG_IDENT, trigger
        )
    }

    fn lookup_formatted_call(&self, trigger: &str, args: &[String]) -> String {
        let substitutions = args
            .iter()
            .enumerate()
            .map(|(i, snippet)| format!("\"{}\": {}", i, snippet))
            .collect::<Vec<_>>()
            .join(", ");
        if substitutions.is_empty() {
            format!(
                "{}.lookupFormatted({}, \"{}\", {{}})",
                self.config.runtime_ident, LANG_IDENT, trigger
            )
        } else {
            format!(
                "{}.lookupFormatted({}, \"{}\", {{ {} }})",
                self.config.runtime_ident, LANG_IDENT, trigger, substitutions
            )
        }
    }

    fn mark_needs_lang(&mut self) {
        match self.fn_stack.last_mut() {
            Some(frame) => frame.needs_lang = true,
            None => self.needs_top_level_lang = true,
        }
    }

    /// `send("hello", extra)` -> `send(i18n.lookup(lang, "m:1"), extra)`.
    fn rewrite_plain(&mut self, node: &CallExpr) -> bool {
        let Some(arg) = node.args.first() else {
            return false;
        };
        if arg.spread.is_some() {
            return false;
        }
        let Some((text, span)) = Self::literal_arg(&arg.expr) else {
            self.warn_unextractable(&arg.expr);
            return false;
        };
        if text.trim().is_empty() {
            return false;
        }

        let trigger = self.intern(&text);
        let start = self.unit.offset(span.lo);
        let end = self.unit.offset(span.hi);
        let replacement = self.lookup_call(&trigger);
        self.patches.replace(start, end, replacement);
        self.mark_needs_lang();
        self.rewrites += 1;
        true
    }

    /// `sendf("hi {0}", user)` -> `send(i18n.lookupFormatted(lang, "m:1",
    /// { "0": user }))`. The format arguments move into the substitution
    /// object verbatim.
    fn rewrite_format(&mut self, node: &CallExpr, rename: Option<(Span, String)>) -> bool {
        let Some(first) = node.args.first() else {
            return false;
        };
        if node.args.iter().any(|a| a.spread.is_some()) {
            let (line, col) = self.unit.line_col(node.span.lo);
            warn!(
                "{}:{}:{}: spread argument in format call left as is",
                self.module_id, line, col
            );
            return false;
        }
        let Some((text, _)) = Self::literal_arg(&first.expr) else {
            self.warn_unextractable(&first.expr);
            return false;
        };
        if text.trim().is_empty() {
            return false;
        }
        let Some(last) = node.args.last() else {
            return false;
        };

        let trigger = self.intern(&text);
        let extras: Vec<String> = node.args[1..]
            .iter()
            .map(|a| self.unit.snippet(a.expr.span()).to_string())
            .collect();
        let start = self.unit.offset(first.expr.span().lo);
        let end = self.unit.offset(last.expr.span().hi);
        let replacement = self.lookup_formatted_call(&trigger, &extras);
        self.patches.replace(start, end, replacement);

        if let Some((span, plain)) = rename {
            self.patches
                .replace(self.unit.offset(span.lo), self.unit.offset(span.hi), plain);
        }
        self.mark_needs_lang();
        self.rewrites += 1;
        true
    }

    /// `i18n.registerUntranslated("text")` -> `i18n.lookup(lang, "m:1")`.
    /// Formatting arguments are preserved: with extra arguments the call
    /// becomes a `lookupFormatted` with the arguments moved into the
    /// substitution object.
    fn rewrite_register(&mut self, node: &CallExpr) -> bool {
        let Some(first) = node.args.first() else {
            return false;
        };
        if node.args.iter().any(|a| a.spread.is_some()) {
            return false;
        }
        let Some((text, _)) = Self::literal_arg(&first.expr) else {
            // Dynamic text is what registerUntranslated is for at runtime.
            return false;
        };
        if text.trim().is_empty() {
            return false;
        }

        let trigger = self.intern(&text);
        let extras: Vec<String> = node.args[1..]
            .iter()
            .map(|a| self.unit.snippet(a.expr.span()).to_string())
            .collect();
        let replacement = if extras.is_empty() {
            self.lookup_call(&trigger)
        } else {
            self.lookup_formatted_call(&trigger, &extras)
        };
        let start = self.unit.offset(node.span.lo);
        let end = self.unit.offset(node.span.hi);
        self.patches.replace(start, end, replacement);
        self.mark_needs_lang();
        self.rewrites += 1;
        true
    }

    /// Re-register an already-migrated call so its entry survives the flush.
    /// Duplicate texts collapse onto the first trigger seen for them.
    fn visit_migrated(&mut self, node: &CallExpr) {
        self.mark_needs_lang();

        let trigger = node.args.get(1).and_then(|arg| match &*arg.expr {
            Expr::Lit(Lit::Str(s)) => s.value.as_str().map(|t| t.to_string()),
            _ => None,
        });
        let Some(trigger) = trigger else {
            let (line, col) = self.unit.line_col(node.span.lo);
            warn!(
                "{}:{}:{}: lookup call with a dynamic trigger",
                self.module_id, line, col
            );
            node.visit_children_with(self);
            return;
        };

        match TranslationStore::module_of(&trigger) {
            Some(module) if module == self.module_id => {}
            _ => {
                debug!("trigger {} belongs to another module, left as is", trigger);
                node.visit_children_with(self);
                return;
            }
        }

        let Some(entry) = self
            .store
            .entry(self.store.default_locale(), self.module_id, &trigger)
        else {
            let (line, col) = self.unit.line_col(node.span.lo);
            warn!(
                "{}:{}:{}: unknown trigger \"{}\", call left untouched",
                self.module_id, line, col, trigger
            );
            node.visit_children_with(self);
            return;
        };
        let text = entry.value.clone();

        match self.dedup.get(&text) {
            Some(canonical) if *canonical != trigger => {
                // Same text already has a trigger in this unit; repoint the
                // call and let the duplicate entry fall out on flush.
                let canonical = canonical.clone();
                if let Some(arg) = node.args.get(1) {
                    let span = arg.expr.span();
                    self.patches.replace(
                        self.unit.offset(span.lo),
                        self.unit.offset(span.hi),
                        format!("\"{}\"", canonical),
                    );
                }
            }
            Some(_) => {}
            None => {
                self.dedup.insert(text, trigger.clone());
                self.rewrite.record_existing(&*self.store, &trigger);
            }
        }
        node.visit_children_with(self);
    }

    fn note_load_module(&mut self, node: &CallExpr) {
        if let Some(arg) = node.args.first()
            && let Expr::Lit(Lit::Str(s)) = &*arg.expr
            && s.value.as_str() == Some(self.module_id)
        {
            self.has_load_module = true;
        }
    }

    fn binds_lang(var: &VarDecl) -> bool {
        var.decls
            .iter()
            .any(|d| matches!(&d.name, Pat::Ident(ident) if ident.id.sym.as_str() == LANG_IDENT))
    }

    fn block_binds_lang(block: &BlockStmt) -> bool {
        matches!(
            block.stmts.first(),
            Some(Stmt::Decl(Decl::Var(var))) if Self::binds_lang(var)
        )
    }

    fn push_frame(&mut self, block: &BlockStmt) {
        let insert_at = self.unit.offset(block.span.lo) + 1;
        let indent = match block.stmts.first() {
            Some(stmt) => self.line_indent(self.unit.offset(stmt.span().lo)),
            None => format!("{}    ", self.line_indent(self.unit.offset(block.span.lo))),
        };
        self.fn_stack.push(FnFrame {
            insert_at,
            indent,
            has_lang_binding: Self::block_binds_lang(block),
            needs_lang: false,
        });
    }

    fn pop_frame(&mut self) {
        if let Some(frame) = self.fn_stack.pop()
            && frame.needs_lang
            && !frame.has_lang_binding
        {
            self.lang_targets.push(LangTarget {
                insert_at: frame.insert_at,
                indent: frame.indent,
            });
        }
    }
}

impl<'a> Visit for RewriteVisitor<'a> {
    fn visit_module(&mut self, node: &Module) {
        for item in &node.body {
            if let ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) = item
                && Self::binds_lang(var)
            {
                self.has_top_level_lang = true;
            }
        }
        node.visit_children_with(self);
    }

    fn visit_import_decl(&mut self, node: &ImportDecl) {
        if let Some(src) = node.src.value.as_str() {
            if src == self.config.runtime_package {
                self.has_runtime_import = true;
            }
            self.imports.push(ImportFact {
                src: src.to_string(),
                start: self.unit.offset(node.span.lo),
                end: self.unit.offset(node.span.hi),
            });
        }
    }

    fn visit_function(&mut self, node: &Function) {
        match &node.body {
            Some(body) => {
                self.push_frame(body);
                node.visit_children_with(self);
                self.pop_frame();
            }
            None => node.visit_children_with(self),
        }
    }

    fn visit_constructor(&mut self, node: &Constructor) {
        match &node.body {
            Some(body) => {
                self.push_frame(body);
                node.visit_children_with(self);
                self.pop_frame();
            }
            None => node.visit_children_with(self),
        }
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        match &*node.body {
            BlockStmtOrExpr::BlockStmt(block) => {
                self.push_frame(block);
                node.visit_children_with(self);
                self.pop_frame();
            }
            // Expression bodies cannot hold a binding; a rewrite inside one
            // binds the locale in the nearest enclosing block instead.
            BlockStmtOrExpr::Expr(_) => node.visit_children_with(self),
        }
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        match self.classify(node) {
            Some(CallKind::Migrated) => {
                self.visit_migrated(node);
                return;
            }
            Some(CallKind::Format { rename }) => {
                if self.rewrite_format(node, rename) {
                    // The remaining arguments were copied verbatim into the
                    // substitution object; do not rewrite inside the copy.
                    return;
                }
            }
            Some(CallKind::Plain) => {
                self.rewrite_plain(node);
            }
            Some(CallKind::Register) => {
                if self.rewrite_register(node) {
                    return;
                }
            }
            Some(CallKind::LoadModule) => {
                self.note_load_module(node);
            }
            None => {}
        }
        node.visit_children_with(self);
    }
}
