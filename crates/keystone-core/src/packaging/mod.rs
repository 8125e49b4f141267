//! # Keystone Packaging
//!
//! Everything that turns a set of discovered packages into a loaded
//! application:
//!
//! - [`PackageDescriptor`]: a package's static metadata.
//! - [`dependency`]: the dependency graph and the deterministic load-order
//!   resolver.
//! - [`Package`]: the entry points a package exposes to the loader.
//! - [`PackageCatalog`]: the discovered packages plus enable/disable
//!   overrides.
//! - [`PackageLoader`]: the package pass itself.
//! - [`PackagingHook`]: callbacks fired as packages finish loading.
pub mod catalog;
pub mod dependency;
pub mod descriptor;
pub mod error;
pub mod hooks;
pub mod loader;
pub mod traits;

pub use catalog::PackageCatalog;
pub use dependency::{DependencyError, DependencyGraph, resolve};
pub use descriptor::PackageDescriptor;
pub use error::{LoadStage, PackagingError};
pub use hooks::PackagingHook;
pub use loader::{PackageLoader, PackageState};
pub use traits::Package;
