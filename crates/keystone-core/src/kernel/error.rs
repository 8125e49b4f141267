//! # Keystone Kernel Errors
//!
//! Defines the crate-wide [`Error`] type and the errors owned by the kernel
//! itself.
//!
//! [`Error`] wraps every subsystem error ([`PackagingError`],
//! [`HookError`], [`StorageSystemError`]) through `#[from]` conversions, so
//! code anywhere in the crate can use `?` and still hand the caller a typed
//! error. The kernel's own failures are [`ComponentError`] (component
//! registry), [`ContextError`] (application context) and lifecycle
//! violations reported as [`Error::KernelLifecycleError`].
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::hooks::error::HookError;
use crate::kernel::component::ComponentKey;
use crate::kernel::bootstrap::ApplicationStatus;
use crate::packaging::error::PackagingError;
use crate::packaging::dependency::DependencyError;
use crate::storage::error::StorageSystemError;

/// Custom error type for Keystone applications
#[derive(Debug, ThisError)]
pub enum Error {
    /// Package discovery, resolution or loading failed
    #[error("Packaging error: {0}")]
    Packaging(#[from] PackagingError),

    /// Component registration or lookup failed
    #[error("Component registry error: {0}")]
    Component(#[from] ComponentError),

    /// Hook registration or dispatch failed
    #[error("Hook system error: {0}")]
    HookSystem(#[from] HookError),

    /// Config store or filesystem failure
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// Application context access failed
    #[error("Application context error: {0}")]
    Context(#[from] ContextError),

    /// Error occurring during a specific kernel lifecycle phase.
    #[error("Kernel lifecycle error during {phase}: {message}")]
    KernelLifecycleError {
        phase: KernelLifecyclePhase,
        message: String,
        #[source]
        source: Option<Box<Error>>,
    },

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Represents a specific phase in the application lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum KernelLifecyclePhase {
    #[error("Load")]
    Load,
    #[error("Run")]
    Run,
    #[error("Terminate")]
    Terminate,
}

/// Errors raised by the [`ComponentRegistry`](crate::kernel::component::ComponentRegistry).
#[derive(Debug, ThisError)]
pub enum ComponentError {
    #[error("Component name must not be blank")]
    InvalidComponentName,

    #[error("A component is already registered under '{key}' and replace was not requested")]
    DuplicateComponent { key: ComponentKey },

    #[error("No component is registered under '{key}'")]
    ComponentNotFound { key: ComponentKey },

    #[error("Component '{key}' is a '{actual}', not the requested '{requested}'")]
    TypeMismatch {
        key: ComponentKey,
        requested: &'static str,
        actual: &'static str,
    },
}

/// Errors raised by the [`ApplicationContext`](crate::kernel::context::ApplicationContext).
#[derive(Debug, ThisError)]
pub enum ContextError {
    #[error("Key '{0}' is already present in the application context and replace was not requested")]
    DuplicateContextKey(String),

    #[error("Key '{0}' was not found in the application context")]
    ContextKeyNotFound(String),

    #[error("Context value '{key}' is not a '{requested}'")]
    TypeMismatch { key: String, requested: &'static str },
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<DependencyError> for Error {
    fn from(err: DependencyError) -> Self {
        Error::Packaging(PackagingError::Resolution(err))
    }
}

impl Error {
    /// Builds a lifecycle error for an operation attempted in the wrong status.
    pub fn invalid_status(
        phase: KernelLifecyclePhase,
        current: ApplicationStatus,
        expected: ApplicationStatus,
    ) -> Self {
        Error::KernelLifecycleError {
            phase,
            message: format!("application is {current}, expected {expected}"),
            source: None,
        }
    }

    /// Returns the dependency error buried in this error, if resolution failed.
    pub fn as_dependency_error(&self) -> Option<&DependencyError> {
        match self {
            Error::Packaging(PackagingError::Resolution(dep)) => Some(dep),
            _ => None,
        }
    }
}
