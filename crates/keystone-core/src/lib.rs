//! # keystone-core
//!
//! Bootstraps a modular application out of independently developed
//! packages: resolves a deterministic load order, loads each package's
//! config stores, lets packages register their components and hooks, and
//! dispatches lifecycle hooks along the way.
pub mod hooks;
pub mod kernel;
pub mod packaging;
pub mod storage;

pub use hooks::{HookKind, HookRegistry};
pub use kernel::error::Error as KernelError;
pub use kernel::{Application, ApplicationHook, ApplicationStatus, ComponentKey, ComponentRegistry};
pub use packaging::{Package, PackageCatalog, PackageDescriptor, PackagingHook};
pub use storage::{ConfigData, ConfigStore};

#[cfg(test)]
mod tests;
