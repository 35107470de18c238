//! Parsing, literal extraction and source rewriting.

pub mod extract;
pub mod parser;
pub mod rewrite;
pub mod scanner;

pub use extract::{FoundLiteral, inspect_unit};
pub use rewrite::{UnitRewrite, rewrite_unit};
pub use scanner::collect_units;
