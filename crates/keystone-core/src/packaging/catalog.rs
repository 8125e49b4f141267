use std::collections::HashMap;
use std::fmt;

use crate::packaging::descriptor::PackageDescriptor;
use crate::packaging::error::PackagingError;
use crate::packaging::traits::Package;

/// Discovered packages, in discovery order.
///
/// Enable/disable overrides are kept beside the packages so the descriptors
/// the packages declare stay untouched.
#[derive(Default)]
pub struct PackageCatalog {
    packages: Vec<Box<dyn Package>>,
    index: HashMap<String, usize>,
    overrides: HashMap<String, bool>,
}

impl fmt::Debug for PackageCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageCatalog")
            .field("packages", &self.names())
            .field("overrides", &self.overrides)
            .finish()
    }
}

impl PackageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a discovered package. Names must be valid and unique.
    pub fn add(&mut self, package: Box<dyn Package>) -> Result<(), PackagingError> {
        let descriptor = package.descriptor();
        descriptor.validate_name()?;

        let name = descriptor.name().to_string();
        if self.index.contains_key(&name) {
            return Err(PackagingError::DuplicatePackage(name));
        }

        log::debug!("Discovered package '{}'", name);
        self.index.insert(name, self.packages.len());
        self.packages.push(package);
        Ok(())
    }

    /// Builder form of [`add`](Self::add)
    pub fn with(mut self, package: impl Package + 'static) -> Result<Self, PackagingError> {
        self.add(Box::new(package))?;
        Ok(self)
    }

    /// Override the enabled flag of a discovered package.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), PackagingError> {
        if !self.index.contains_key(name) {
            return Err(PackagingError::PackageNotFound(name.to_string()));
        }
        self.overrides.insert(name.to_string(), enabled);
        Ok(())
    }

    pub fn disable(&mut self, name: &str) -> Result<(), PackagingError> {
        self.set_enabled(name, false)
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        match self.overrides.get(name) {
            Some(enabled) => *enabled,
            None => self.get(name).is_some_and(|p| p.descriptor().is_enabled()),
        }
    }

    /// Effective descriptors, overrides applied, in discovery order
    pub fn descriptors(&self) -> Vec<PackageDescriptor> {
        self.packages
            .iter()
            .map(|package| {
                let descriptor = package.descriptor().clone();
                match self.overrides.get(descriptor.name()) {
                    Some(enabled) => descriptor.with_enabled(*enabled),
                    None => descriptor,
                }
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Package> {
        self.index.get(name).map(|&i| self.packages[i].as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.packages.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
