#![cfg(test)]

use std::fs;
use std::sync::Arc;

use serde::Deserialize;
use tempfile::tempdir;

use crate::kernel::bootstrap::Application;
use crate::kernel::error::{Error, Result};
use crate::packaging::{LoadStage, Package, PackageCatalog, PackageDescriptor, PackagingError};
use crate::storage::error::StorageSystemError;

#[derive(Debug, Deserialize)]
struct DatabaseSettings {
    url: String,
    pool_size: u32,
}

/// Reads its settings in `load()` and publishes them as a component
struct DatabasePackage {
    descriptor: PackageDescriptor,
}

impl DatabasePackage {
    fn new() -> Self {
        Self {
            descriptor: PackageDescriptor::new("database").with_config_store("database"),
        }
    }
}

impl Package for DatabasePackage {
    fn descriptor(&self) -> &PackageDescriptor {
        &self.descriptor
    }

    fn load(&self, app: &mut Application) -> Result<()> {
        let settings: DatabaseSettings = app.config("database")?.parse()?;
        app.components_mut()
            .register("database.settings", Arc::new(settings), false)?;
        Ok(())
    }
}

#[test]
fn test_package_reads_active_section_from_settings_dir() {
    let dir = tempdir().expect("Failed to create temp directory");
    fs::write(
        dir.path().join("database.json"),
        r#"{
            "active": { "selected": "test" },
            "production": { "url": "postgres://prod", "pool_size": 20 },
            "test": { "url": "sqlite::memory:", "pool_size": 1 }
        }"#,
    )
    .unwrap();

    let mut catalog = PackageCatalog::new();
    catalog.add(Box::new(DatabasePackage::new())).unwrap();
    let mut app = Application::with_settings_dir(dir.path()).scripting(true);

    app.load(&catalog).unwrap();
    let settings = app.get_component::<DatabaseSettings>("database.settings").unwrap();
    assert_eq!(settings.url, "sqlite::memory:");
    assert_eq!(settings.pool_size, 1);
}

#[test]
fn test_missing_store_file_fails_at_config_stage() {
    let dir = tempdir().expect("Failed to create temp directory");
    let mut catalog = PackageCatalog::new();
    catalog.add(Box::new(DatabasePackage::new())).unwrap();
    let mut app = Application::with_settings_dir(dir.path()).scripting(true);

    let err = app.load(&catalog).unwrap_err();
    match err {
        Error::Packaging(PackagingError::LoadFailed {
            package,
            stage,
            source,
        }) => {
            assert_eq!(package, "database");
            assert_eq!(
                stage,
                LoadStage::Config {
                    section: "database".to_string()
                }
            );
            assert!(matches!(
                *source,
                Error::StorageSystem(StorageSystemError::ConfigNotFound { .. })
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_invalid_settings_fail_at_load_stage() {
    let dir = tempdir().expect("Failed to create temp directory");
    fs::write(
        dir.path().join("database.json"),
        r#"{ "main": { "url": "postgres://prod" } }"#,
    )
    .unwrap();

    let mut catalog = PackageCatalog::new();
    catalog.add(Box::new(DatabasePackage::new())).unwrap();
    let mut app = Application::with_settings_dir(dir.path()).scripting(true);

    let err = app.load(&catalog).unwrap_err();
    let Error::Packaging(failure) = &err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(failure.failure_point(), Some(("database", &LoadStage::Load)));
}
