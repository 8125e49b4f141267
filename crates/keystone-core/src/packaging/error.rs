//! # Keystone Packaging Errors
//!
//! [`PackagingError`] covers everything between discovery and the end of the
//! package pass: catalog validation, load-order resolution (wrapping
//! [`DependencyError`]) and per-package load failures.
//!
//! A load failure always names the package and the [`LoadStage`] it failed
//! in, with the underlying error kept as its source.
use thiserror::Error;

use crate::kernel::component::ComponentKey;
use crate::kernel::error::Error;
use crate::packaging::dependency::DependencyError;

/// The step of a package's load that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadStage {
    #[error("config section '{section}'")]
    Config { section: String },
    #[error("module-init")]
    ModuleInit,
    #[error("load()")]
    Load,
    #[error("hook '{event}'")]
    Hook { event: &'static str },
}

#[derive(Debug, Error)]
pub enum PackagingError {
    #[error("Failed to resolve the package load order: {0}")]
    Resolution(#[from] DependencyError),

    #[error("Invalid package name '{0}': expected non-empty, dot-separated segments")]
    InvalidPackageName(String),

    #[error("Package '{0}' was discovered more than once")]
    DuplicatePackage(String),

    #[error("Package '{0}' not found")]
    PackageNotFound(String),

    #[error("Package '{package}' declares component '{key}' but did not register it")]
    MissingDeclaredComponent { package: String, key: ComponentKey },

    #[error("Package '{package}' failed at {stage}: {source}")]
    LoadFailed {
        package: String,
        stage: LoadStage,
        #[source]
        source: Box<Error>,
    },

    #[error("Packages have already been loaded")]
    AlreadyLoaded,
}

impl PackagingError {
    pub fn load_failed(package: impl Into<String>, stage: LoadStage, source: Error) -> Self {
        PackagingError::LoadFailed {
            package: package.into(),
            stage,
            source: Box::new(source),
        }
    }

    /// Package and stage of a load failure
    pub fn failure_point(&self) -> Option<(&str, &LoadStage)> {
        match self {
            PackagingError::LoadFailed { package, stage, .. } => Some((package, stage)),
            _ => None,
        }
    }
}
