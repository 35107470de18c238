//! `extract`: move literals into the store and rewrite call sites.
//!
//! Units are processed sequentially in sorted order so trigger ids are
//! deterministic. A unit that fails to read or parse is reported and skipped;
//! the rest of the run continues.
//!
//! Without `--apply` this is a dry run: rewritten units are printed and
//! neither sources nor records are written, so a later real run allocates the
//! same ids.

use std::env;
use std::fs;

use anyhow::{Context, Result};
use colored::Colorize;
use log::info;

use crate::cli::args::ExtractCommand;
use crate::cli::commands::helper;
use crate::cli::exit_status::ExitStatus;
use crate::core::{collect_units, rewrite_unit};

pub fn extract(cmd: ExtractCommand) -> Result<ExitStatus> {
    let config = helper::effective_config(&cmd.common)?;
    let mut store = helper::open_store(&config);
    let cwd = env::current_dir().context("failed to resolve the working directory")?;
    let units = collect_units(&cmd.inputs, &cwd)?;

    let mut failed = false;
    let mut changed_units = 0;
    let mut total_entries = 0;

    for path in &units {
        let source = match fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))
        {
            Ok(source) => source,
            Err(err) => {
                eprintln!("{}", format!("{:#}", err).red());
                failed = true;
                continue;
            }
        };

        let result = match rewrite_unit(path, source, &config, &mut store) {
            Ok(result) => result,
            Err(err) => {
                eprintln!("{}", format!("{}: {:#}", path.display(), err).red());
                failed = true;
                continue;
            }
        };

        total_entries += result.module_rewrite.len();
        let module = result.module_rewrite.module.clone();

        if cmd.apply {
            // Flushing even an empty rewrite prunes entries whose call
            // sites are gone, but only for modules the store already knows.
            if result.touched || store.has_module(&module) {
                store.flush(result.module_rewrite)?;
            }
            if result.changed {
                fs::write(path, &result.output)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                changed_units += 1;
            }
        } else if result.changed {
            println!("{}", result.output);
            changed_units += 1;
        }
    }

    info!(
        "{} entries across {} units, {} units rewritten{}",
        total_entries,
        units.len(),
        changed_units,
        if cmd.apply { "" } else { " (dry run)" }
    );
    if failed {
        Ok(ExitStatus::Failure)
    } else {
        Ok(ExitStatus::Success)
    }
}
