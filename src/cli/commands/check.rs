//! `check`: validate locales against the default locale.

use anyhow::Result;
use colored::Colorize;

use crate::cli::args::CheckCommand;
use crate::cli::commands::helper;
use crate::cli::exit_status::ExitStatus;
use crate::rules;

pub fn check(cmd: CheckCommand) -> Result<ExitStatus> {
    let config = helper::effective_config(&cmd.common)?;
    let mut store = helper::open_store(&config);

    let default_locale = config.default_locale.clone();
    let mut failed_loads = store.load_all(&default_locale)?.failed;

    let violations = match &cmd.locale {
        Some(locale) => {
            failed_loads += store.load_all(locale)?.failed;
            rules::check_locale(&store, locale)
        }
        None => {
            for locale in store.discover_locales()? {
                if locale != default_locale {
                    failed_loads += store.load_all(&locale)?.failed;
                }
            }
            rules::check_all(&store)
        }
    };

    if failed_loads > 0 {
        eprintln!(
            "{}",
            format!("{} records failed to load", failed_loads).red()
        );
    }
    if !violations.is_empty() {
        eprintln!("{}", format!("{} violations found", violations.len()).red());
    }
    if violations.is_empty() && failed_loads == 0 {
        println!("no violations");
        Ok(ExitStatus::Success)
    } else {
        Ok(ExitStatus::Failure)
    }
}
