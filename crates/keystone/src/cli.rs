use keystone_core::kernel::error::Result;
use keystone_core::packaging::{PackageCatalog, PackageDescriptor};

use core_logging::LoggingPackage;

/// Catalog of the first-party packages shipped with the binary, with the
/// `--disable` overrides applied.
pub fn discover(disabled: &[String]) -> Result<PackageCatalog> {
    let mut catalog = PackageCatalog::new();
    catalog.add(Box::new(LoggingPackage::new()))?;

    for name in disabled {
        catalog.disable(name)?;
    }
    Ok(catalog)
}

/// One line of `packages list` output
pub fn describe(descriptor: &PackageDescriptor) -> String {
    let status = if descriptor.is_enabled() { "enabled" } else { "disabled" };
    let depends = if descriptor.depends().is_empty() {
        "-".to_string()
    } else {
        descriptor.depends().join(", ")
    };
    let mut line = format!("{} [{}] depends: {}", descriptor.name(), status, depends);
    if !descriptor.config_store_names().is_empty() {
        line.push_str(&format!(" config: {}", descriptor.config_store_names().join(", ")));
    }
    if let Some(key) = descriptor.component_key() {
        line.push_str(&format!(" component: {}", key));
    }
    line
}
