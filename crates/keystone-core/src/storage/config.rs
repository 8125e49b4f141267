use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::kernel::constants::{ACTIVE_SECTION, ACTIVE_SECTION_SELECTOR};
use crate::kernel::error::Result;
use crate::storage::StorageProvider;
use crate::storage::error::StorageSystemError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Every format compiled in, in lookup order
    pub fn all() -> Vec<ConfigFormat> {
        #[allow(unused_mut)]
        let mut formats = vec![ConfigFormat::Json];
        #[cfg(feature = "toml-config")]
        formats.push(ConfigFormat::Toml);
        #[cfg(feature = "yaml-config")]
        formats.push(ConfigFormat::Yaml);
        formats
    }

    /// Get the file extensions for this format, preferred first
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            ConfigFormat::Json => &["json"],
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => &["yaml", "yml"],
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => &["toml"],
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    /// Parse the text of config store `store` in this format
    pub fn parse<T: DeserializeOwned>(&self, store: &str, data: &str) -> std::result::Result<T, StorageSystemError> {
        let deserialization_error = |format: &str, source: Box<dyn std::error::Error + Send + Sync>| {
            StorageSystemError::DeserializationError {
                store: store.to_string(),
                format: format.to_string(),
                source,
            }
        };
        match self {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| deserialization_error("json", Box::new(e))),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| deserialization_error("yaml", Box::new(e))),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| deserialization_error("toml", Box::new(e))),
        }
    }
}

/// A flat key/value mapping, the unit handed to packages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigData {
    #[serde(flatten)]
    values: BTreeMap<String, serde_json::Value>,
}

impl ConfigData {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self { values: BTreeMap::new() }
    }

    pub fn from_map(values: BTreeMap<String, serde_json::Value>) -> Self {
        Self { values }
    }

    /// Get a configuration value, `None` if absent or of another shape
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Get a configuration value with default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Raw access to a value
    pub fn get_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Set a configuration value
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| StorageSystemError::ValueConversion {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        self.values.insert(key.to_string(), json_value);
        Ok(())
    }

    /// Builder form of [`set`](Self::set) for plain JSON values
    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    /// Remove a configuration value
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.values.remove(key)
    }

    /// Check if key exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Get all keys, sorted
    pub fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge with another config, overriding existing values
    pub fn merge(&mut self, other: &ConfigData) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Deserialize the whole mapping into a typed settings struct
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        let object = serde_json::Value::Object(self.values.clone().into_iter().collect());
        serde_json::from_value(object).map_err(|e| {
            StorageSystemError::ValueConversion {
                key: "<section>".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

/// The named sections of one config store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSections {
    store: String,
    sections: BTreeMap<String, ConfigData>,
}

impl ConfigSections {
    pub fn new(store: impl Into<String>) -> Self {
        Self {
            store: store.into(),
            sections: BTreeMap::new(),
        }
    }

    /// A store holding a single section named after the store itself
    pub fn single(store: impl Into<String>, data: ConfigData) -> Self {
        let store = store.into();
        let mut sections = Self::new(store.clone());
        sections.sections.insert(store, data);
        sections
    }

    /// Build from a parsed document whose top-level values must all be tables
    pub fn from_document(
        store: impl Into<String>,
        document: BTreeMap<String, serde_json::Value>,
    ) -> std::result::Result<Self, StorageSystemError> {
        let mut sections = Self::new(store);
        for (name, value) in document {
            match value {
                serde_json::Value::Object(map) => {
                    sections
                        .sections
                        .insert(name, ConfigData::from_map(map.into_iter().collect()));
                }
                other => {
                    return Err(StorageSystemError::InvalidStore {
                        store: sections.store.clone(),
                        reason: format!("top-level key '{name}' must be a section, found {other}"),
                    });
                }
            }
        }
        Ok(sections)
    }

    pub fn with_section(mut self, name: impl Into<String>, data: ConfigData) -> Self {
        self.sections.insert(name.into(), data);
        self
    }

    pub fn store(&self) -> &str {
        &self.store
    }

    pub fn section_names(&self) -> Vec<String> {
        self.sections.keys().cloned().collect()
    }

    pub fn section(&self, name: &str) -> std::result::Result<&ConfigData, StorageSystemError> {
        self.sections.get(name).ok_or_else(|| StorageSystemError::SectionNotFound {
            store: self.store.clone(),
            section: name.to_string(),
        })
    }

    /// The section named by `active.selected`, or every section flattened
    /// into one mapping when the store has no `active` section.
    pub fn active(&self) -> std::result::Result<ConfigData, StorageSystemError> {
        if let Some(active) = self.sections.get(ACTIVE_SECTION) {
            let selected: String = active.get(ACTIVE_SECTION_SELECTOR).ok_or_else(|| {
                StorageSystemError::InvalidStore {
                    store: self.store.clone(),
                    reason: format!("section '{ACTIVE_SECTION}' has no string '{ACTIVE_SECTION_SELECTOR}' key"),
                }
            })?;
            return self.section(&selected).cloned();
        }

        let mut flat = ConfigData::new();
        for data in self.sections.values() {
            for key in data.values.keys() {
                if flat.contains_key(key) {
                    return Err(StorageSystemError::DuplicateKey {
                        store: self.store.clone(),
                        key: key.clone(),
                    });
                }
            }
            flat.merge(data);
        }
        Ok(flat)
    }
}

/// Supplies the configuration sections packages declare.
pub trait ConfigStore: Send + Sync + fmt::Debug {
    /// Get the name of this store
    fn name(&self) -> &str;

    /// Load the active mapping of the store called `name`.
    ///
    /// A store that does not exist is a
    /// [`StorageSystemError::ConfigNotFound`].
    fn load_section(&self, name: &str) -> Result<ConfigData>;

    /// Names of every store available, sorted
    fn store_names(&self) -> Result<Vec<String>>;
}

/// Config stores read from `<dir>/<name>.<ext>` through a [`StorageProvider`]
#[derive(Debug, Clone)]
pub struct FileConfigStore<P: StorageProvider + ?Sized> {
    provider: Arc<P>,
    directory: PathBuf,
}

impl<P: StorageProvider + ?Sized> FileConfigStore<P> {
    pub fn new(provider: Arc<P>, directory: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// First existing file for store `name`, trying formats in [`ConfigFormat::all`] order
    pub fn resolve_store_path(&self, name: &str) -> Option<PathBuf> {
        ConfigFormat::all()
            .iter()
            .flat_map(|format| format.extensions().iter())
            .map(|ext| self.directory.join(format!("{name}.{ext}")))
            .find(|path| self.provider.is_file(path))
    }

    /// Read and parse every section of store `name`
    pub fn load_store(&self, name: &str) -> Result<ConfigSections> {
        let path = self.resolve_store_path(name).ok_or_else(|| StorageSystemError::ConfigNotFound {
            name: name.to_string(),
        })?;
        let format = ConfigFormat::from_path(&path)
            .ok_or_else(|| StorageSystemError::UnsupportedConfigFormat(path.display().to_string()))?;

        log::debug!("Reading config store '{}' from {}", name, path.display());
        let content = self.provider.read_to_string(&path)?;
        let document: BTreeMap<String, serde_json::Value> = format.parse(name, &content)?;
        Ok(ConfigSections::from_document(name, document)?)
    }
}

impl<P: StorageProvider + ?Sized> ConfigStore for FileConfigStore<P> {
    fn name(&self) -> &str {
        "file"
    }

    fn load_section(&self, name: &str) -> Result<ConfigData> {
        Ok(self.load_store(name)?.active()?)
    }

    fn store_names(&self) -> Result<Vec<String>> {
        if !self.provider.is_dir(&self.directory) {
            return Ok(vec![]);
        }

        let mut names: Vec<String> = self
            .provider
            .read_dir(&self.directory)?
            .into_iter()
            .filter(|path| self.provider.is_file(path) && ConfigFormat::from_path(path).is_some())
            .filter_map(|path| path.file_stem().and_then(|stem| stem.to_str().map(String::from)))
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}

/// Config stores held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    stores: BTreeMap<String, ConfigSections>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a store made of a single flat mapping
    pub fn with_section(mut self, name: impl Into<String>, data: ConfigData) -> Self {
        let name = name.into();
        self.stores.insert(name.clone(), ConfigSections::single(name, data));
        self
    }

    /// Add a store with several sections
    pub fn with_store(mut self, sections: ConfigSections) -> Self {
        self.stores.insert(sections.store().to_string(), sections);
        self
    }
}

impl ConfigStore for MemoryConfigStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn load_section(&self, name: &str) -> Result<ConfigData> {
        let sections = self.stores.get(name).ok_or_else(|| StorageSystemError::ConfigNotFound {
            name: name.to_string(),
        })?;
        Ok(sections.active()?)
    }

    fn store_names(&self) -> Result<Vec<String>> {
        Ok(self.stores.keys().cloned().collect())
    }
}
