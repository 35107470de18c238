use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".tslocrc.json";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Locale whose values are the source of truth.
    #[serde(default = "default_locale")]
    pub default_locale: String,
    /// Function names whose first string argument is extracted verbatim.
    #[serde(default)]
    pub funcs: Vec<String>,
    /// Function names whose first string argument is a format template.
    #[serde(default)]
    pub fmtfuncs: Vec<String>,
    /// Directory holding per-locale translation records.
    #[serde(default = "default_translations_root")]
    pub translations_root: String,
    /// Identifier the runtime module is imported as.
    #[serde(default = "default_runtime_ident")]
    pub runtime_ident: String,
    /// Package the runtime module is imported from.
    #[serde(default = "default_runtime_package")]
    pub runtime_package: String,
    /// Expression rewritten calls use to resolve the active locale.
    #[serde(default = "default_locale_resolver")]
    pub locale_resolver: String,
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_translations_root() -> String {
    "./trans".to_string()
}

fn default_runtime_ident() -> String {
    "i18n".to_string()
}

fn default_runtime_package() -> String {
    "@tsloc/runtime".to_string()
}

fn default_locale_resolver() -> String {
    "i18n.currentLocale()".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            funcs: Vec::new(),
            fmtfuncs: Vec::new(),
            translations_root: default_translations_root(),
            runtime_ident: default_runtime_ident(),
            runtime_package: default_runtime_package(),
            locale_resolver: default_locale_resolver(),
        }
    }
}

impl Config {
    pub fn is_plain_func(&self, name: &str) -> bool {
        self.funcs.iter().any(|f| f == name)
    }

    pub fn is_format_func(&self, name: &str) -> bool {
        self.fmtfuncs.iter().any(|f| f == name)
    }

    /// The plain name a format function call site should be renamed to, when
    /// its name is a configured plain name plus an `f` suffix (`sendf` ->
    /// `send`).
    pub fn unformat_name<'a>(&self, name: &'a str) -> Option<&'a str> {
        let trimmed = name.strip_suffix('f')?;
        self.is_plain_func(trimmed).then_some(trimmed)
    }

    /// Validate configuration values.
    ///
    /// A name configured both plain and format would make call sites
    /// ambiguous, and a malformed default locale would corrupt record paths.
    pub fn validate(&self) -> Result<()> {
        for name in &self.funcs {
            if self.is_format_func(name) {
                bail!("\"{}\" is configured in both funcs and fmtfuncs", name);
            }
        }
        if !is_valid_locale_tag(&self.default_locale) {
            bail!("invalid default locale tag: \"{}\"", self.default_locale);
        }
        Ok(())
    }
}

/// Accepts `xx`, `xxx` and `xx-YY` style tags. Locale tags become directory
/// names, so anything else is rejected.
pub fn is_valid_locale_tag(tag: &str) -> bool {
    let mut parts = tag.split('-');
    let Some(language) = parts.next() else {
        return false;
    };
    if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_lowercase()) {
        return false;
    }
    match parts.next() {
        None => true,
        Some(region) => {
            parts.next().is_none()
                && region.len() == 2
                && region.chars().all(|c| c.is_ascii_uppercase())
        }
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("failed to generate default config")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_locale, "en-US");
        assert_eq!(config.translations_root, "./trans");
        assert_eq!(config.runtime_ident, "i18n");
        assert!(config.funcs.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let json = r#"{
              "defaultLocale": "en",
              "funcs": ["send", "reply"],
              "fmtfuncs": ["sendf"],
              "translationsRoot": "./locales"
          }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.default_locale, "en");
        assert_eq!(config.funcs, vec!["send", "reply"]);
        assert_eq!(config.fmtfuncs, vec!["sendf"]);
        assert_eq!(config.translations_root, "./locales");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let json = r#"{ "funcs": ["send"] }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.funcs, vec!["send"]);
        assert_eq!(config.runtime_package, "@tsloc/runtime");
        assert_eq!(config.locale_resolver, "i18n.currentLocale()");
    }

    #[test]
    fn test_unformat_name() {
        let config = Config {
            funcs: vec!["send".to_string()],
            fmtfuncs: vec!["sendf".to_string(), "renderf".to_string()],
            ..Default::default()
        };
        assert_eq!(config.unformat_name("sendf"), Some("send"));
        assert_eq!(config.unformat_name("renderf"), None);
        assert_eq!(config.unformat_name("send"), None);
    }

    #[test]
    fn test_validate_overlapping_funcs() {
        let config = Config {
            funcs: vec!["send".to_string()],
            fmtfuncs: vec!["send".to_string()],
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("send"));
    }

    #[test]
    fn test_validate_locale_tag() {
        assert!(is_valid_locale_tag("en"));
        assert!(is_valid_locale_tag("en-US"));
        assert!(is_valid_locale_tag("fil"));
        assert!(!is_valid_locale_tag(""));
        assert!(!is_valid_locale_tag("EN"));
        assert!(!is_valid_locale_tag("en-us"));
        assert!(!is_valid_locale_tag("en-US-x"));
        assert!(!is_valid_locale_tag("../etc"));
    }

    #[test]
    fn test_find_config_file() {
        let dir = tempdir().unwrap();
        let sub_dir = dir.path().join("src").join("commands");
        fs::create_dir_all(&sub_dir).unwrap();

        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "{}").unwrap();

        let found = find_config_file(&sub_dir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_stops_at_git_root() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        assert!(find_config_file(dir.path()).is_none());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "funcs": ["send"] }"#,
        )
        .unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(result.from_file);
        assert_eq!(result.config.funcs, vec!["send"]);
    }

    #[test]
    fn test_load_config_default_when_not_found() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let result = load_config(dir.path()).unwrap();
        assert!(!result.from_file);
        assert_eq!(result.config.default_locale, "en-US");
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{ "defaultLocale": "Not A Locale" }"#,
        )
        .unwrap();

        assert!(load_config(dir.path()).is_err());
    }

    #[test]
    fn test_default_config_json_round_trips() {
        let json = default_config_json().unwrap();
        let config: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.default_locale, Config::default().default_locale);
        assert!(json.contains("translationsRoot"));
    }
}
