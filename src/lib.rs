//! String extraction and rewriting for localized JS/TS codebases.
//!
//! `tsloc` finds string literals passed to configured messaging functions,
//! moves them into per-locale XML records under a translation root, and
//! rewrites the call sites to fetch the text through a runtime module at the
//! active locale. Repeated runs are idempotent: already-migrated calls are
//! re-registered so their entries survive, stale entries are pruned, and
//! trigger ids never get reused.
//!
//! The companion `check` pass validates every locale against the default
//! one: trigger and id agreement, `{N}` placeholder balance, an inline
//! markup allow-list and marker symbol counts.

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod rules;
pub mod store;
