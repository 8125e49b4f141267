pub mod config;
pub mod error;
pub mod local;
pub mod provider;

/// Re-export key types
pub use config::{ConfigData, ConfigFormat, ConfigSections, ConfigStore, FileConfigStore, MemoryConfigStore};
pub use error::StorageSystemError;
pub use local::LocalStorageProvider;
pub use provider::StorageProvider;

// Test module declaration
#[cfg(test)]
mod tests;
