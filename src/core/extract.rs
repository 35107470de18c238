//! Read-only literal survey for `inspect`.
//!
//! Walks a parsed unit and reports every user-facing string literal with a
//! provisional tag, so authors can see what an extraction pass would pick up
//! before any file is rewritten. Tags use a run-wide atomic counter, which
//! keeps them unique across units even when units are inspected in parallel.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use log::{debug, warn};
use swc_common::{SourceMap, Span};
use swc_ecma_ast::{
    BinExpr, BinaryOp, ExportAll, Expr, FnDecl, ImportDecl, NamedExport, PropName, Str, Tpl,
    TsType,
};
use swc_ecma_visit::{Visit, VisitWith};

use super::parser::{ParsedUnit, parse_unit};
use crate::config::Config;

/// One string literal found during inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundLiteral {
    pub tag: String,
    pub text: String,
    pub line: usize,
    pub col: usize,
}

/// Parse one unit and list its extractable string literals.
pub fn inspect_unit(
    path: &Path,
    code: String,
    config: &Config,
    source_map: Arc<SourceMap>,
    counter: &AtomicU64,
) -> Result<Vec<FoundLiteral>> {
    let unit = parse_unit(path, code, source_map)?;
    let mut visitor = LiteralVisitor {
        unit: &unit,
        path: &path.to_string_lossy(),
        config,
        counter,
        found: Vec::new(),
    };
    visitor.visit_module(&unit.module);
    Ok(visitor.found)
}

struct LiteralVisitor<'a> {
    unit: &'a ParsedUnit,
    path: &'a str,
    config: &'a Config,
    counter: &'a AtomicU64,
    found: Vec<FoundLiteral>,
}

impl<'a> LiteralVisitor<'a> {
    fn record(&mut self, span: Span, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let (line, col) = self.unit.line_col(span.lo);
        self.found.push(FoundLiteral {
            tag: format!("{}:{}", self.path, n),
            text: text.to_string(),
            line,
            col,
        });
    }
}

impl<'a> Visit for LiteralVisitor<'a> {
    fn visit_str(&mut self, node: &Str) {
        if let Some(text) = node.value.as_str() {
            let text = text.to_string();
            self.record(node.span, &text);
        }
    }

    fn visit_tpl(&mut self, node: &Tpl) {
        if node.exprs.is_empty() {
            if let Some(text) = node
                .quasis
                .first()
                .and_then(|q| q.cooked.as_ref())
                .and_then(|s| s.as_str())
            {
                let text = text.to_string();
                self.record(node.span, &text);
            }
            return;
        }
        let (line, col) = self.unit.line_col(node.span.lo);
        warn!(
            "{}:{}:{}: template literal with substitutions skipped",
            self.path, line, col
        );
        node.visit_children_with(self);
    }

    fn visit_bin_expr(&mut self, node: &BinExpr) {
        if node.op != BinaryOp::Add {
            node.visit_children_with(self);
            return;
        }
        // String concatenation cannot be extracted as one entry; flag the
        // literal operands and keep looking inside the rest.
        for operand in [&node.left, &node.right] {
            match &**operand {
                Expr::Lit(swc_ecma_ast::Lit::Str(s)) => {
                    let (line, col) = self.unit.line_col(s.span.lo);
                    warn!(
                        "{}:{}:{}: concatenated string literal skipped",
                        self.path, line, col
                    );
                }
                other => other.visit_with(self),
            }
        }
    }

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        // Declaring a configured function is not a call site; say so and
        // keep looking inside the body.
        let name = node.ident.sym.as_str();
        if self.config.is_plain_func(name) || self.config.is_format_func(name) {
            debug!(
                "{}: declaration of configured function {} traversed, not extracted",
                self.path, name
            );
        }
        node.visit_children_with(self);
    }

    // Module specifiers, object keys and string literal types are not
    // user-facing text.
    fn visit_import_decl(&mut self, _node: &ImportDecl) {}

    fn visit_export_all(&mut self, _node: &ExportAll) {}

    fn visit_named_export(&mut self, _node: &NamedExport) {}

    fn visit_prop_name(&mut self, _node: &PropName) {}

    fn visit_ts_type(&mut self, _node: &TsType) {}
}
