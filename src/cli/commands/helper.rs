use std::path::PathBuf;

use anyhow::{Context, Result};
use log::debug;

use crate::cli::args::CommonArgs;
use crate::config::{CONFIG_FILE_NAME, Config, ConfigLoadResult, load_config};
use crate::store::TranslationStore;

/// Configuration for this invocation: the config file (or defaults) with
/// command-line overrides applied on top.
pub fn effective_config(common: &CommonArgs) -> Result<Config> {
    let current = std::env::current_dir().context("cannot determine working directory")?;
    let ConfigLoadResult {
        mut config,
        from_file,
    } = load_config(&current)?;
    if from_file {
        debug!("configuration loaded from {}", CONFIG_FILE_NAME);
    }

    if let Some(locale) = &common.default_locale {
        config.default_locale = locale.clone();
    }
    if let Some(root) = &common.translations_root {
        config.translations_root = root.clone();
    }
    if !common.funcs.is_empty() {
        config.funcs = common.funcs.clone();
    }
    if !common.fmtfuncs.is_empty() {
        config.fmtfuncs = common.fmtfuncs.clone();
    }

    config.validate()?;
    Ok(config)
}

pub fn open_store(config: &Config) -> TranslationStore {
    TranslationStore::new(
        PathBuf::from(&config.translations_root),
        config.default_locale.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn common() -> CommonArgs {
        CommonArgs {
            default_locale: None,
            translations_root: None,
            funcs: Vec::new(),
            fmtfuncs: Vec::new(),
            verbose: false,
        }
    }

    #[test]
    fn test_overrides_applied() {
        let mut args = common();
        args.default_locale = Some("de".to_string());
        args.funcs = vec!["send".to_string()];

        let config = effective_config(&args).unwrap();
        assert_eq!(config.default_locale, "de");
        assert_eq!(config.funcs, vec!["send"]);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let mut args = common();
        args.default_locale = Some("Not A Locale".to_string());
        assert!(effective_config(&args).is_err());
    }
}
