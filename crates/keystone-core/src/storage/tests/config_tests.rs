use std::fs;
use std::sync::Arc;

use serde::Deserialize;
use tempfile::{TempDir, tempdir};

use crate::kernel::error::{Error, Result};
use crate::storage::config::{
    ConfigData, ConfigFormat, ConfigSections, ConfigStore, FileConfigStore, MemoryConfigStore,
};
use crate::storage::error::StorageSystemError;
use crate::storage::local::LocalStorageProvider;

fn file_store(files: &[(&str, &str)]) -> (FileConfigStore<LocalStorageProvider>, TempDir) {
    let dir = tempdir().expect("Failed to create temp directory");
    for (name, content) in files {
        fs::write(dir.path().join(name), content).expect("Failed to write config file");
    }
    let provider = Arc::new(LocalStorageProvider::new(dir.path()));
    (FileConfigStore::new(provider, ""), dir)
}

fn storage_error(err: Error) -> StorageSystemError {
    match err {
        Error::StorageSystem(e) => e,
        other => panic!("expected a storage error, got {other}"),
    }
}

#[test]
fn test_config_data_basic() -> Result<()> {
    let mut config = ConfigData::new();
    config.set("string_value", "hello")?;
    config.set("int_value", 42)?;
    config.set("array", vec![1, 2, 3])?;

    assert_eq!(config.get::<String>("string_value").unwrap(), "hello");
    assert_eq!(config.get::<i32>("int_value").unwrap(), 42);
    assert_eq!(config.get::<Vec<u8>>("array").unwrap(), vec![1, 2, 3]);
    assert_eq!(config.get::<bool>("string_value"), None);
    assert_eq!(config.get_or("missing_key", "default".to_string()), "default");

    assert!(config.remove("int_value").is_some());
    assert!(!config.contains_key("int_value"));
    assert_eq!(config.keys(), vec!["array", "string_value"]);
    Ok(())
}

#[test]
fn test_config_data_merge_overrides() {
    let mut base = ConfigData::new().with("level", "info").with("color", true);
    let overrides = ConfigData::new().with("level", "debug");
    base.merge(&overrides);

    assert_eq!(base.get::<String>("level").as_deref(), Some("debug"));
    assert_eq!(base.get::<bool>("color"), Some(true));
    assert_eq!(base.len(), 2);
}

#[test]
fn test_config_data_parses_into_typed_settings() -> Result<()> {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Pool {
        size: u32,
        #[serde(default)]
        name: Option<String>,
    }

    let data = ConfigData::new().with("size", 8);
    assert_eq!(data.parse::<Pool>()?, Pool { size: 8, name: None });

    let wrong = ConfigData::new().with("size", "eight");
    assert!(wrong.parse::<Pool>().is_err());
    Ok(())
}

#[test]
fn test_format_from_path() {
    assert_eq!(ConfigFormat::from_path("a.json".as_ref()), Some(ConfigFormat::Json));
    assert_eq!(ConfigFormat::from_path("a.JSON".as_ref()), Some(ConfigFormat::Json));
    assert_eq!(ConfigFormat::from_path("a.ini".as_ref()), None);
    #[cfg(feature = "toml-config")]
    assert_eq!(ConfigFormat::from_path("a.toml".as_ref()), Some(ConfigFormat::Toml));
    #[cfg(feature = "yaml-config")]
    assert_eq!(ConfigFormat::from_path("a.yml".as_ref()), Some(ConfigFormat::Yaml));
}

#[test]
fn test_active_section_is_selected() {
    let sections = ConfigSections::new("database")
        .with_section("active", ConfigData::new().with("selected", "production"))
        .with_section("development", ConfigData::new().with("url", "sqlite://dev"))
        .with_section("production", ConfigData::new().with("url", "postgres://prod"));

    let active = sections.active().unwrap();
    assert_eq!(active.get::<String>("url").as_deref(), Some("postgres://prod"));
    assert_eq!(active.len(), 1);
}

#[test]
fn test_active_section_pointing_nowhere_fails() {
    let sections = ConfigSections::new("database")
        .with_section("active", ConfigData::new().with("selected", "staging"))
        .with_section("production", ConfigData::new());

    let err = sections.active().unwrap_err();
    assert!(matches!(err, StorageSystemError::SectionNotFound { ref section, .. } if section == "staging"));
}

#[test]
fn test_active_section_without_selector_is_invalid() {
    let sections = ConfigSections::new("database").with_section("active", ConfigData::new());
    assert!(matches!(sections.active(), Err(StorageSystemError::InvalidStore { .. })));
}

#[test]
fn test_sections_flatten_without_active() {
    let sections = ConfigSections::new("app")
        .with_section("server", ConfigData::new().with("port", 8080))
        .with_section("cache", ConfigData::new().with("ttl", 60));

    let flat = sections.active().unwrap();
    assert_eq!(flat.get::<u16>("port"), Some(8080));
    assert_eq!(flat.get::<u32>("ttl"), Some(60));
}

#[test]
fn test_flatten_rejects_repeated_keys() {
    let sections = ConfigSections::new("app")
        .with_section("server", ConfigData::new().with("timeout", 5))
        .with_section("client", ConfigData::new().with("timeout", 10));

    let err = sections.active().unwrap_err();
    assert!(matches!(err, StorageSystemError::DuplicateKey { ref key, .. } if key == "timeout"));
}

#[test]
fn test_file_store_reads_json() {
    let (store, _dir) = file_store(&[(
        "logging.json",
        r#"{ "active": { "selected": "verbose" }, "verbose": { "level": "debug" }, "quiet": { "level": "warn" } }"#,
    )]);

    let section = store.load_section("logging").unwrap();
    assert_eq!(section.get::<String>("level").as_deref(), Some("debug"));
}

#[cfg(feature = "toml-config")]
#[test]
fn test_file_store_reads_toml() {
    let (store, _dir) = file_store(&[(
        "mailer.toml",
        "[smtp]\nhost = \"localhost\"\nport = 25\n\n[sender]\nfrom = \"noreply@example.com\"\n",
    )]);

    let section = store.load_section("mailer").unwrap();
    assert_eq!(section.get::<String>("host").as_deref(), Some("localhost"));
    assert_eq!(section.get::<u16>("port"), Some(25));
    assert_eq!(section.get::<String>("from").as_deref(), Some("noreply@example.com"));
}

#[cfg(feature = "yaml-config")]
#[test]
fn test_file_store_reads_yaml() {
    let (store, _dir) = file_store(&[("cache.yaml", "redis:\n  ttl: 300\n")]);
    let section = store.load_section("cache").unwrap();
    assert_eq!(section.get::<u32>("ttl"), Some(300));
}

#[test]
fn test_file_store_missing_store() {
    let (store, _dir) = file_store(&[]);
    let err = storage_error(store.load_section("absent").unwrap_err());
    assert!(matches!(err, StorageSystemError::ConfigNotFound { ref name } if name == "absent"));
}

#[test]
fn test_file_store_rejects_top_level_values() {
    let (store, _dir) = file_store(&[("broken.json", r#"{ "level": "debug" }"#)]);
    let err = storage_error(store.load_section("broken").unwrap_err());
    assert!(matches!(err, StorageSystemError::InvalidStore { ref store, .. } if store == "broken"));
}

#[test]
fn test_file_store_reports_parse_errors() {
    let (store, _dir) = file_store(&[("bad.json", "{ not json")]);
    let err = storage_error(store.load_section("bad").unwrap_err());
    assert!(matches!(err, StorageSystemError::DeserializationError { ref format, .. } if format == "json"));
}

#[test]
fn test_file_store_lists_store_names() {
    let (store, _dir) = file_store(&[
        ("zeta.json", "{}"),
        ("alpha.json", "{}"),
        ("notes.txt", "ignored"),
    ]);
    assert_eq!(store.store_names().unwrap(), vec!["alpha", "zeta"]);
    assert_eq!(store.name(), "file");
}

#[test]
fn test_memory_store() {
    let store = MemoryConfigStore::new()
        .with_section("api", ConfigData::new().with("prefix", "/v1"))
        .with_store(
            ConfigSections::new("database")
                .with_section("active", ConfigData::new().with("selected", "test"))
                .with_section("test", ConfigData::new().with("url", "sqlite::memory:")),
        );

    assert_eq!(store.store_names().unwrap(), vec!["api", "database"]);
    let api = store.load_section("api").unwrap();
    assert_eq!(api.get::<String>("prefix").as_deref(), Some("/v1"));
    let database = store.load_section("database").unwrap();
    assert_eq!(database.get::<String>("url").as_deref(), Some("sqlite::memory:"));
    assert!(store.load_section("missing").is_err());
}
