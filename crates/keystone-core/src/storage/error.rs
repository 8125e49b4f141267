//! # Keystone Storage System Errors
//!
//! Defines [`StorageSystemError`], covering file I/O performed through a
//! [`StorageProvider`](crate::storage::StorageProvider) and every way a config
//! store can be missing or malformed.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageSystemError {
    #[error("I/O error during operation '{operation}' on path '{path}': {source}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found at path: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Deserialization of config store '{store}' from '{format}' failed: {source}")]
    DeserializationError {
        store: String,
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Unsupported configuration format: {0}")]
    UnsupportedConfigFormat(String),

    #[error("Config store '{name}' not found")]
    ConfigNotFound { name: String },

    #[error("Section '{section}' not found in config store '{store}'")]
    SectionNotFound { store: String, section: String },

    #[error("Key '{key}' appears in more than one section of config store '{store}'")]
    DuplicateKey { store: String, key: String },

    #[error("Config store '{store}' is malformed: {reason}")]
    InvalidStore { store: String, reason: String },

    #[error("Failed to convert config value '{key}': {reason}")]
    ValueConversion { key: String, reason: String },
}

// Helper for creating Io errors, ensuring path is always included.
impl StorageSystemError {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        StorageSystemError::Io {
            source,
            operation: operation.into(),
            path,
        }
    }
}
