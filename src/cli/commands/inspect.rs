//! `inspect`: list extractable string literals without touching anything.

use std::env;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use anyhow::{Context, Result};
use colored::Colorize;
use rayon::prelude::*;
use swc_common::SourceMap;

use crate::cli::args::InspectCommand;
use crate::cli::commands::helper;
use crate::cli::exit_status::ExitStatus;
use crate::core::{FoundLiteral, collect_units, inspect_unit};

pub fn inspect(cmd: InspectCommand) -> Result<ExitStatus> {
    let config = helper::effective_config(&cmd.common)?;
    let cwd = env::current_dir().context("failed to resolve the working directory")?;
    let units = collect_units(&cmd.inputs, &cwd)?;
    let counter = AtomicU64::new(0);

    let results: Vec<(&std::path::PathBuf, Result<Vec<FoundLiteral>>)> = units
        .par_iter()
        .map(|path| {
            let result = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))
                .and_then(|code| {
                    inspect_unit(path, code, &config, Arc::new(SourceMap::default()), &counter)
                });
            (path, result)
        })
        .collect();

    let mut failed = false;
    let mut total = 0;
    for (path, result) in results {
        match result {
            Ok(found) => {
                for literal in found {
                    println!(
                        "{}\t{}:{}\t{:?}",
                        literal.tag, literal.line, literal.col, literal.text
                    );
                    total += 1;
                }
            }
            Err(err) => {
                eprintln!("{}", format!("{}: {:#}", path.display(), err).red());
                failed = true;
            }
        }
    }

    eprintln!("{} literals in {} units", total, units.len());
    if failed {
        Ok(ExitStatus::Failure)
    } else {
        Ok(ExitStatus::Success)
    }
}
