//! `new-locale`: scaffold a locale from the default locale's records.

use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::cli::args::NewLocaleCommand;
use crate::cli::commands::helper;
use crate::cli::exit_status::ExitStatus;
use crate::config::is_valid_locale_tag;

pub fn new_locale(cmd: NewLocaleCommand) -> Result<ExitStatus> {
    let config = helper::effective_config(&cmd.common)?;

    if !is_valid_locale_tag(&cmd.locale) {
        bail!("invalid locale tag: \"{}\"", cmd.locale);
    }
    if cmd.locale == config.default_locale {
        bail!("\"{}\" is the default locale", cmd.locale);
    }
    let target = PathBuf::from(&config.translations_root).join(&cmd.locale);
    if target.exists() {
        bail!("locale \"{}\" already exists at {}", cmd.locale, target.display());
    }

    let store = helper::open_store(&config);
    let cloned = store.clone_locale(&cmd.locale)?;
    println!("{}: {} modules scaffolded", cmd.locale, cloned);
    Ok(ExitStatus::Success)
}
