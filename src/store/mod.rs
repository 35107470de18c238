//! In-memory multi-locale translation store backed by per-locale,
//! per-module XML records.
//!
//! Layout on disk is `<root>/<locale>/<module>.xml`, where the module id is
//! the source unit's path with its extension stripped. Triggers embed their
//! module (`src/app:3`), so a trigger alone is enough to locate an entry.
//!
//! The store is constructed once per run and threaded explicitly through the
//! extractor, rewriter and validator. `flush` is the only operation that
//! writes persistent records, and it replaces exactly one module's entry set
//! per call; every other module and locale is left untouched.

pub mod record;

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::{debug, error, warn};
use walkdir::WalkDir;

use record::{Row, TranslationFile};

/// One translatable string.
///
/// An empty `value` means "not yet translated": lookups fall back to the
/// default locale, and `comment` carries the default text for translators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub id: u32,
    pub trigger: String,
    pub value: String,
    pub comment: String,
}

/// Entries of one module under one locale, in last-rewrite encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleData {
    pub entries: HashMap<String, Entry>,
    pub order: Vec<String>,
}

/// Outcome of a locale directory walk: modules loaded and records that
/// failed to decode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub failed: usize,
}

pub struct TranslationStore {
    root: PathBuf,
    default_locale: String,
    data: HashMap<String, HashMap<String, ModuleData>>,
    counters: HashMap<String, u32>,
}

impl TranslationStore {
    pub fn new(root: PathBuf, default_locale: String) -> Self {
        let mut data = HashMap::new();
        // The default locale always exists, even before any record is loaded.
        data.insert(default_locale.clone(), HashMap::new());
        Self {
            root,
            default_locale,
            data,
            counters: HashMap::new(),
        }
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Module id for a source unit path: the path with its extension
    /// stripped and separators normalized.
    pub fn module_id(path: &Path) -> String {
        let id = path.with_extension("").to_string_lossy().replace('\\', "/");
        id.strip_prefix("./").unwrap_or(&id).to_string()
    }

    /// The module a trigger belongs to (`src/app:3` -> `src/app`).
    pub fn module_of(trigger: &str) -> Option<&str> {
        trigger.rsplit_once(':').map(|(module, _)| module)
    }

    /// Record file for one (locale, module). Module ids must stay relative,
    /// so a record can never land outside `<root>/<locale>`.
    fn record_path(&self, locale: &str, module: &str) -> Result<PathBuf> {
        let relative = Path::new(module);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            bail!("module id escapes the translations root: {}", module);
        }
        Ok(self.root.join(locale).join(format!("{}.xml", module)))
    }

    /// Load the persisted record for one (locale, module). A missing record
    /// is an empty module; a malformed record is an error for the caller.
    pub fn load(&mut self, locale: &str, module: &str) -> Result<()> {
        let path = self.record_path(locale, module)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("no record at {}, treating as empty", path.display());
                return Ok(());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", path.display()));
            }
        };

        let file = TranslationFile::from_xml(&content)
            .with_context(|| format!("record {}/{}", locale, module))?;

        let counter = if file.counter > 0 {
            file.counter
        } else {
            file.rows.len() as u32
        };

        let module_data = self
            .data
            .entry(locale.to_string())
            .or_default()
            .entry(module.to_string())
            .or_default();
        module_data.entries.clear();
        module_data.order.clear();
        for row in file.rows {
            if row.trigger.is_empty() {
                // ignore empties
                continue;
            }
            module_data.order.push(row.trigger.clone());
            module_data.entries.insert(
                row.trigger.clone(),
                Entry {
                    id: row.id,
                    trigger: row.trigger,
                    value: row.value,
                    comment: row.comment,
                },
            );
        }

        let current = self.counters.entry(module.to_string()).or_insert(0);
        if *current < counter {
            *current = counter;
        }
        Ok(())
    }

    /// Load every module persisted under one locale. A record that fails to
    /// decode is logged and counted, not fatal: the rest of the locale still
    /// loads.
    pub fn load_all(&mut self, locale: &str) -> Result<LoadReport> {
        let base = self.root.join(locale);
        if !base.is_dir() {
            debug!("no records for locale {}", locale);
            self.data.entry(locale.to_string()).or_default();
            return Ok(LoadReport::default());
        }

        let mut report = LoadReport::default();
        for entry in WalkDir::new(&base).sort_by_file_name() {
            let entry = entry.with_context(|| format!("failed to walk {}", base.display()))?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("xml") {
                continue;
            }
            let module = Self::module_id(
                path.strip_prefix(&base)
                    .with_context(|| format!("record outside locale root: {}", path.display()))?,
            );
            match self.load(locale, &module) {
                Ok(()) => report.loaded += 1,
                Err(err) => {
                    error!("{:#}", err);
                    report.failed += 1;
                }
            }
        }
        self.data.entry(locale.to_string()).or_default();
        Ok(report)
    }

    /// Load one module's records for every locale present on disk.
    /// Idempotent: reloading replaces the in-memory module data.
    pub fn load_module(&mut self, module: &str) -> Result<()> {
        for locale in self.discover_locales()? {
            self.load(&locale, module)?;
        }
        Ok(())
    }

    /// Locale directories present under the store root.
    pub fn discover_locales(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read {}", self.root.display()));
            }
        };

        let mut locales = Vec::new();
        for entry in entries {
            let entry =
                entry.with_context(|| format!("failed to read {}", self.root.display()))?;
            let name = entry.file_name().to_string_lossy().to_string();
            if entry.path().is_dir() && !name.starts_with('.') {
                locales.push(name);
            }
        }
        locales.sort();
        Ok(locales)
    }

    /// Locales currently loaded, sorted. Always includes the default locale.
    pub fn locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = self.data.keys().cloned().collect();
        locales.sort();
        locales
    }

    /// Modules loaded under one locale, sorted by module id.
    pub fn modules(&self, locale: &str) -> Vec<(&String, &ModuleData)> {
        let mut modules: Vec<(&String, &ModuleData)> = self
            .data
            .get(locale)
            .map(|m| m.iter().collect())
            .unwrap_or_default();
        modules.sort_by_key(|(module, _)| module.as_str());
        modules
    }

    pub fn entry(&self, locale: &str, module: &str, trigger: &str) -> Option<&Entry> {
        self.data
            .get(locale)?
            .get(module)?
            .entries
            .get(trigger)
    }

    pub fn entry_count(&self, locale: &str) -> usize {
        self.data
            .get(locale)
            .map(|modules| modules.values().map(|m| m.order.len()).sum())
            .unwrap_or(0)
    }

    /// Whether any loaded locale has entries for this module.
    pub fn has_module(&self, module: &str) -> bool {
        self.data
            .values()
            .any(|modules| modules.get(module).is_some_and(|m| !m.order.is_empty()))
    }

    /// Runtime lookup: the locale's value, else the default locale's value,
    /// else the empty string. Never fails the host program.
    pub fn lookup(&self, locale: &str, trigger: &str) -> String {
        let Some(module) = Self::module_of(trigger) else {
            return String::new();
        };
        match self.entry(locale, module, trigger) {
            Some(entry) if !entry.value.is_empty() => entry.value.clone(),
            _ => self
                .entry(&self.default_locale, module, trigger)
                .map(|entry| entry.value.clone())
                .unwrap_or_default(),
        }
    }

    /// Runtime lookup with `{key}` substitution. Keys are placeholder tokens
    /// without braces.
    pub fn lookup_formatted(
        &self,
        locale: &str,
        trigger: &str,
        substitutions: &HashMap<String, String>,
    ) -> String {
        let mut value = self.lookup(locale, trigger);
        for (key, replacement) in substitutions {
            value = value.replace(&format!("{{{}}}", key), replacement);
        }
        value
    }

    /// Runtime registration of a string that has not been extracted yet:
    /// warn and pass the text through unchanged.
    pub fn register_untranslated(&self, text: &str) -> String {
        warn!("untranslated string passed through: {:?}", text);
        text.to_string()
    }

    /// Allocate the next id for a module. Ids are monotonic per module and
    /// never reused, even after entries are removed.
    pub fn next_id(&mut self, module: &str) -> u32 {
        let counter = self.counters.entry(module.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }

    pub fn counter(&self, module: &str) -> u32 {
        self.counters.get(module).copied().unwrap_or(0)
    }

    /// Replace one module's entry set, in memory and on disk, for every
    /// locale the rewrite pass produced plus every loaded locale that
    /// already held the module. Other modules are never touched.
    pub fn flush(&mut self, rewrite: ModuleRewrite) -> Result<()> {
        let ModuleRewrite {
            module,
            order,
            entries,
        } = rewrite;
        let counter = self.counters.get(&module).copied().unwrap_or(0);

        let mut locales: BTreeSet<String> = entries.keys().cloned().collect();
        for (locale, modules) in &self.data {
            if modules.contains_key(&module) {
                locales.insert(locale.clone());
            }
        }
        locales.insert(self.default_locale.clone());

        for locale in locales {
            let locale_entries = entries.get(&locale);
            let mut module_data = ModuleData::default();
            let mut rows = Vec::with_capacity(order.len());
            for trigger in &order {
                let Some(entry) = locale_entries.and_then(|m| m.get(trigger)) else {
                    continue;
                };
                rows.push(Row {
                    id: entry.id,
                    trigger: entry.trigger.clone(),
                    value: entry.value.clone(),
                    comment: entry.comment.clone(),
                });
                module_data.order.push(trigger.clone());
                module_data.entries.insert(trigger.clone(), entry.clone());
            }

            let path = self.record_path(&locale, &module)?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            let file = TranslationFile { rows, counter };
            fs::write(&path, file.to_xml()?)
                .with_context(|| format!("failed to write {}", path.display()))?;

            self.data
                .entry(locale)
                .or_default()
                .insert(module.clone(), module_data);
        }
        Ok(())
    }

    /// Scaffold a new locale from the default locale's records: every value
    /// moves into the comment field and is emptied, so translators see the
    /// source text. Returns the number of modules cloned.
    pub fn clone_locale(&self, new_locale: &str) -> Result<usize> {
        let base = self.root.join(&self.default_locale);
        if !base.is_dir() {
            return Ok(0);
        }

        let mut cloned = 0;
        for entry in WalkDir::new(&base).sort_by_file_name() {
            let entry = entry.with_context(|| format!("failed to walk {}", base.display()))?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("xml") {
                continue;
            }

            let content = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let mut file = TranslationFile::from_xml(&content)
                .with_context(|| format!("record {}", path.display()))?;
            for row in &mut file.rows {
                row.comment = std::mem::take(&mut row.value);
            }

            let relative = path
                .strip_prefix(&base)
                .with_context(|| format!("record outside locale root: {}", path.display()))?;
            let target = self.root.join(new_locale).join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(&target, file.to_xml()?)
                .with_context(|| format!("failed to write {}", target.display()))?;
            cloned += 1;
        }
        Ok(cloned)
    }

    #[cfg(test)]
    pub fn insert_for_tests(&mut self, locale: &str, entry: Entry) {
        let module = Self::module_of(&entry.trigger)
            .unwrap_or_default()
            .to_string();
        let module_data = self
            .data
            .entry(locale.to_string())
            .or_default()
            .entry(module)
            .or_default();
        module_data.order.push(entry.trigger.clone());
        module_data.entries.insert(entry.trigger.clone(), entry);
    }
}

/// Freshly computed entry set for one module, produced by a rewrite pass.
///
/// Only triggers actually (re)encountered during the pass are recorded, so
/// flushing prunes entries whose call sites are gone.
#[derive(Debug, Default)]
pub struct ModuleRewrite {
    pub module: String,
    order: Vec<String>,
    entries: HashMap<String, HashMap<String, Entry>>,
}

impl ModuleRewrite {
    pub fn new(module: String) -> Self {
        Self {
            module,
            order: Vec::new(),
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn contains(&self, trigger: &str) -> bool {
        self.order.iter().any(|t| t == trigger)
    }

    /// Record a freshly allocated trigger: the default locale gets the
    /// extracted text as its value, every other known locale gets a
    /// comment-only seed unless it already holds the trigger.
    pub fn record_new(&mut self, store: &TranslationStore, trigger: &str, id: u32, text: &str) {
        if self.contains(trigger) {
            return;
        }
        self.order.push(trigger.to_string());
        for locale in store.locales() {
            let entry = if locale == store.default_locale() {
                Entry {
                    id,
                    trigger: trigger.to_string(),
                    value: text.to_string(),
                    comment: String::new(),
                }
            } else if let Some(existing) = store.entry(&locale, &self.module, trigger) {
                existing.clone()
            } else {
                Entry {
                    id,
                    trigger: trigger.to_string(),
                    value: String::new(),
                    comment: text.to_string(),
                }
            };
            self.entries
                .entry(locale)
                .or_default()
                .insert(trigger.to_string(), entry);
        }
    }

    /// Carry an already-migrated trigger forward, preserving each locale's
    /// current entry and seeding comment-only entries where one is missing.
    pub fn record_existing(&mut self, store: &TranslationStore, trigger: &str) {
        if self.contains(trigger) {
            return;
        }
        let Some(default_entry) = store.entry(store.default_locale(), &self.module, trigger)
        else {
            return;
        };
        let id = default_entry.id;
        let default_text = default_entry.value.clone();

        self.order.push(trigger.to_string());
        for locale in store.locales() {
            let entry = store
                .entry(&locale, &self.module, trigger)
                .cloned()
                .unwrap_or_else(|| Entry {
                    id,
                    trigger: trigger.to_string(),
                    value: String::new(),
                    comment: default_text.clone(),
                });
            self.entries
                .entry(locale)
                .or_default()
                .insert(trigger.to_string(), entry);
        }
    }
}
