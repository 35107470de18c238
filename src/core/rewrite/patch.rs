//! Span-anchored text patches.
//!
//! The rewriter never regenerates code; it records byte-range replacements
//! against the original text and splices them in one pass, so untouched
//! formatting, comments and whitespace survive verbatim.

use log::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct PatchSet {
    patches: Vec<Patch>,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, start: usize, end: usize, text: String) {
        self.patches.push(Patch { start, end, text });
    }

    pub fn insert(&mut self, at: usize, text: String) {
        self.replace(at, at, text);
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// Apply all patches to the source. Patches are applied in position
    /// order; a patch overlapping an already-applied one is dropped.
    pub fn apply(mut self, source: &str) -> String {
        self.patches.sort_by_key(|p| (p.start, p.end));

        let mut output = String::with_capacity(source.len());
        let mut cursor = 0;
        for patch in self.patches {
            if patch.start < cursor {
                debug!(
                    "dropping overlapping patch at {}..{}",
                    patch.start, patch.end
                );
                continue;
            }
            output.push_str(&source[cursor..patch.start]);
            output.push_str(&patch.text);
            cursor = patch.end;
        }
        output.push_str(&source[cursor..]);
        output
    }
}
