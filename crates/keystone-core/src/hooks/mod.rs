//! # Keystone Hook System
//!
//! Generic register/dispatch machinery for lifecycle callbacks.
//!
//! A *hook kind* is a trait whose methods are the callbacks of that kind, each
//! with a no-op default body, so a hook overrides only the events it cares
//! about. The trait object type (`dyn PackagingHook`) is tagged with
//! [`HookKind`] and used as the key into the [`HookRegistry`]:
//!
//! ```
//! use std::sync::Arc;
//! use keystone_core::hooks::{HookKind, HookRegistry};
//! use keystone_core::kernel::error::Result;
//!
//! pub trait CacheHook: Send + Sync {
//!     fn cache_cleared(&self, _region: &str) -> Result<()> { Ok(()) }
//! }
//!
//! impl HookKind for dyn CacheHook {
//!     const KIND: &'static str = "cache";
//! }
//!
//! struct Audit;
//! impl CacheHook for Audit {}
//!
//! let mut hooks = HookRegistry::new();
//! hooks.register::<dyn CacheHook>("audit", Arc::new(Audit)).unwrap();
//! let invoked = hooks
//!     .dispatch::<dyn CacheHook, _>("cache_cleared", |hook| hook.cache_cleared("users"))
//!     .unwrap();
//! assert_eq!(invoked, 1);
//! ```
//!
//! The core defines two kinds of its own:
//! [`PackagingHook`](crate::packaging::hooks::PackagingHook) and
//! [`ApplicationHook`](crate::kernel::hooks::ApplicationHook). Every other
//! kind belongs to the subsystem that fires it.
pub mod error;
pub mod registry;

pub use error::HookError;
pub use registry::HookRegistry;

/// Marks a trait object type as a hook kind.
pub trait HookKind: Send + Sync + 'static {
    /// Kind name used in logs and errors
    const KIND: &'static str;
}
