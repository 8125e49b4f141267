use crate::hooks::HookKind;
use crate::kernel::error::Result;

/// Event fired after each package finishes loading
pub const PACKAGE_LOADED: &str = "package_loaded";

/// Event fired once, after the whole load order
pub const AFTER_ALL_PACKAGES_LOADED: &str = "after_all_packages_loaded";

/// Callbacks fired by the package loader.
pub trait PackagingHook: Send + Sync {
    /// `name` has completed its `load()` step.
    fn package_loaded(&self, _name: &str) -> Result<()> {
        Ok(())
    }

    /// Every package in `order` has loaded.
    fn after_all_packages_loaded(&self, _order: &[String]) -> Result<()> {
        Ok(())
    }
}

impl HookKind for dyn PackagingHook {
    const KIND: &'static str = "packaging";
}
