//! Configuration store backed by a TOML file.
//!
//! The file is loaded once at startup, in this order of precedence (first
//! match wins):
//! 1. TOML file given via `--config`
//! 2. `./aide.toml` in the current directory
//! 3. `$XDG_CONFIG_HOME/aide/aide.toml` (or the platform config dir)
//! 4. Built-in defaults (empty store)
//!
//! CLI-visible keys live under the `[ai]` table. Mutations stay in memory
//! until [`ConfigStore::save`] is called.

use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::error::ConfigError;

mod defaults;
mod sources;
mod types;
mod value;

pub use defaults::NAMESPACE;
pub use types::{AiSettings, SETTING_KEYS};
pub use value::{display_value, parse_value, to_json};

use sources::{config_root_dir, read_config_text_with_sources};

/// Explicitly passed key/value handle over the config document.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    document: Table,
    save_path: PathBuf,
}

impl ConfigStore {
    /// Load configuration from disk.
    ///
    /// `path_override` is an explicit config file path (from `--config`).
    pub fn load(path_override: Option<&str>) -> Result<Self, ConfigError> {
        Self::load_from_sources(
            path_override,
            |path| std::fs::read_to_string(path),
            config_root_dir,
        )
    }

    fn load_from_sources<FRead, FRoot>(
        path_override: Option<&str>,
        read_file: FRead,
        config_root: FRoot,
    ) -> Result<Self, ConfigError>
    where
        FRead: Fn(&Path) -> Result<String, std::io::Error>,
        FRoot: Fn() -> Option<PathBuf>,
    {
        let (text, source) = read_config_text_with_sources(path_override, &read_file, &config_root)?;
        let save_path = source.save_path(&config_root);
        tracing::debug!(?source, save_path = %save_path.display(), "loaded config");
        Self::from_toml_str(&text, save_path)
    }

    /// Build a store from TOML text that will save to `save_path`.
    pub fn from_toml_str(text: &str, save_path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let document: Table = toml::from_str(text)?;
        if let Some(ns) = document.get(NAMESPACE) {
            if !ns.is_table() {
                return Err(ConfigError::Invalid(format!(
                    "`{NAMESPACE}` must be a table, got {}",
                    ns.type_str()
                )));
            }
        }
        Ok(Self {
            document,
            save_path: save_path.into(),
        })
    }

    /// File that [`ConfigStore::save`] writes to.
    pub fn path(&self) -> &Path {
        &self.save_path
    }

    /// Look up a dotted key under `ai.*`. An empty key or bare `ai` returns
    /// the whole namespace table.
    pub fn get(&self, key: &str) -> Result<Option<Value>, ConfigError> {
        let path = value::key_path(key)?;
        let Some((last, parents)) = path.split_last() else {
            return Ok(Some(Value::Table(self.namespace())));
        };
        let mut current = match self.document.get(NAMESPACE) {
            Some(Value::Table(table)) => table,
            _ => return Ok(None),
        };
        for segment in parents {
            match current.get(segment) {
                Some(Value::Table(table)) => current = table,
                _ => return Ok(None),
            }
        }
        Ok(current.get(last).cloned())
    }

    /// Set a dotted key under `ai.*`, creating intermediate tables. Returns
    /// the previous value, if any.
    pub fn set(&mut self, key: &str, value: Value) -> Result<Option<Value>, ConfigError> {
        let path = value::key_path(key)?;
        let Some((last, parents)) = path.split_last() else {
            return Err(ConfigError::Invalid(
                "config key cannot be empty".to_string(),
            ));
        };

        let mut current = table_entry(&mut self.document, NAMESPACE, NAMESPACE)?;
        let mut walked = NAMESPACE.to_string();
        for segment in parents {
            walked.push('.');
            walked.push_str(segment);
            current = table_entry(current, segment, &walked)?;
        }
        if matches!(current.get(last), Some(Value::Table(_))) && !value.is_table() {
            return Err(ConfigError::Invalid(format!(
                "`{walked}.{last}` is a table; set one of its keys instead"
            )));
        }
        tracing::debug!(key = %format!("{walked}.{last}"), "config set");
        Ok(current.insert(last.clone(), value))
    }

    /// Snapshot of the `ai` table (empty when absent).
    pub fn namespace(&self) -> Table {
        match self.document.get(NAMESPACE) {
            Some(Value::Table(table)) => table.clone(),
            _ => Table::new(),
        }
    }

    /// Resolve typed AI settings, honoring `AIDE_*` environment overrides.
    pub fn settings(&self) -> Result<AiSettings, ConfigError> {
        AiSettings::resolve(&self.namespace(), |name| std::env::var(name).ok())
    }

    /// Validate a value about to be stored at `key`.
    ///
    /// Only the typed settings in [`SETTING_KEYS`] are checked, and each on
    /// its own: a broken `ai.temperature` never blocks setting another key.
    pub fn check_setting(key: &str, value: &Value) -> Result<(), ConfigError> {
        let path = value::key_path(key)?;
        match path.as_slice() {
            [name] if SETTING_KEYS.contains(&name.as_str()) => AiSettings::check(name, value),
            [name, ..] if SETTING_KEYS.contains(&name.as_str()) => Err(ConfigError::Invalid(
                format!("`{NAMESPACE}.{name}` is a setting and has no nested keys"),
            )),
            _ => Ok(()),
        }
    }

    /// Persist the whole document and return the written path.
    ///
    /// Writes a sibling temp file first and renames it into place so a failed
    /// write never leaves a truncated config behind.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let text = toml::to_string_pretty(&self.document)?;
        if let Some(parent) = self.save_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp_path = self.save_path.with_extension("toml.tmp");
        std::fs::write(&tmp_path, text)?;
        std::fs::rename(&tmp_path, &self.save_path)?;
        tracing::info!(path = %self.save_path.display(), "config saved");
        Ok(self.save_path.clone())
    }
}

/// Fetch (or create) the child table `key`, failing if a scalar is in the way.
fn table_entry<'a>(
    parent: &'a mut Table,
    key: &str,
    display_path: &str,
) -> Result<&'a mut Table, ConfigError> {
    let entry = parent
        .entry(key.to_string())
        .or_insert_with(|| Value::Table(Table::new()));
    match entry {
        Value::Table(table) => Ok(table),
        other => Err(ConfigError::Invalid(format!(
            "`{display_path}` is not a table (found {})",
            other.type_str()
        ))),
    }
}
