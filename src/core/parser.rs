use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use swc_common::{FileName, Globals, SourceFile, SourceMap, Span};
use swc_ecma_ast::Module;
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};

/// A parsed source unit plus everything needed to map AST spans back onto
/// the original text.
pub struct ParsedUnit {
    pub module: Module,
    pub source_map: Arc<SourceMap>,
    pub source_file: Arc<SourceFile>,
    pub source: String,
}

impl std::fmt::Debug for ParsedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedUnit")
            .field("module", &self.module)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl ParsedUnit {
    /// Byte offset of a position within this unit's source text.
    pub fn offset(&self, pos: swc_common::BytePos) -> usize {
        (pos - self.source_file.start_pos).0 as usize
    }

    /// The exact source text covered by a span.
    pub fn snippet(&self, span: Span) -> &str {
        &self.source[self.offset(span.lo)..self.offset(span.hi)]
    }

    /// 1-based line and column of a position, for diagnostics.
    pub fn line_col(&self, pos: swc_common::BytePos) -> (usize, usize) {
        let loc = self.source_map.lookup_char_pos(pos);
        (loc.line, loc.col_display + 1)
    }
}

/// Parse one JS/TS/JSX/TSX source unit into an AST.
///
/// Accepts a shared SourceMap for thread-safe parallel parsing.
pub fn parse_unit(path: &Path, code: String, source_map: Arc<SourceMap>) -> Result<ParsedUnit> {
    use swc_common::GLOBALS;

    // Wrap in GLOBALS.set() for thread safety
    GLOBALS.set(&Globals::new(), || {
        let source = code.clone();
        let source_file =
            source_map.new_source_file(FileName::Real(path.to_path_buf()).into(), code);

        let syntax = Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        });

        let mut parser = Parser::new(syntax, StringInput::from(&*source_file), None);
        let module = parser
            .parse_module()
            .map_err(|e| anyhow!("failed to parse {}: {:?}", path.display(), e))?;

        Ok(ParsedUnit {
            module,
            source_map,
            source_file,
            source,
        })
    })
}
