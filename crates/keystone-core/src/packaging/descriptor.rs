use std::fmt;

use crate::kernel::component::ComponentKey;
use crate::kernel::constants::PACKAGE_NAME_SEPARATOR;
use crate::packaging::error::PackagingError;

/// Static metadata of a package, built once at discovery time.
///
/// Descriptors are assembled with the consuming builder methods below and
/// never mutated afterwards; an enable/disable override produces a new copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    name: String,
    depends: Vec<String>,
    component_key: Option<ComponentKey>,
    config_store_names: Vec<String>,
    enabled: bool,
}

impl PackageDescriptor {
    /// Enabled descriptor with no dependencies
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            depends: Vec::new(),
            component_key: None,
            config_store_names: Vec::new(),
            enabled: true,
        }
    }

    /// Declare a package that must load before this one.
    /// Declaring the same dependency twice keeps the first position.
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.depends.contains(&name) {
            self.depends.push(name);
        }
        self
    }

    /// Key under which this package binds its primary service
    pub fn with_component(mut self, key: impl Into<ComponentKey>) -> Self {
        self.component_key = Some(key.into());
        self
    }

    /// Config store loaded before the package's `load()` step
    pub fn with_config_store(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.config_store_names.contains(&name) {
            self.config_store_names.push(name);
        }
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn disabled(self) -> Self {
        self.with_enabled(false)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn depends(&self) -> &[String] {
        &self.depends
    }

    pub fn component_key(&self) -> Option<&ComponentKey> {
        self.component_key.as_ref()
    }

    pub fn config_store_names(&self) -> &[String] {
        &self.config_store_names
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Check that the name is made of non-empty, dot-separated segments
    /// without surrounding whitespace.
    pub fn validate_name(&self) -> Result<(), PackagingError> {
        let valid = !self.name.is_empty()
            && self
                .name
                .split(PACKAGE_NAME_SEPARATOR)
                .all(|segment| !segment.is_empty() && segment.trim() == segment);
        if valid {
            Ok(())
        } else {
            Err(PackagingError::InvalidPackageName(self.name.clone()))
        }
    }
}

impl fmt::Display for PackageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.depends.is_empty() {
            write!(f, " -> [{}]", self.depends.join(", "))?;
        }
        if !self.enabled {
            write!(f, " (disabled)")?;
        }
        Ok(())
    }
}
