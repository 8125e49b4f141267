use std::collections::BTreeMap;

use crate::kernel::bootstrap::Application;
use crate::kernel::error::{Error, Result};
use crate::packaging::catalog::PackageCatalog;
use crate::packaging::dependency;
use crate::packaging::descriptor::PackageDescriptor;
use crate::packaging::error::{LoadStage, PackagingError};
use crate::packaging::hooks::{AFTER_ALL_PACKAGES_LOADED, PACKAGE_LOADED, PackagingHook};
use crate::packaging::traits::Package;

/// Where a package stands in the package pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageState {
    Pending,
    ConfigLoaded,
    Loaded,
    Failed,
}

/// Runs the package pass over a catalog.
///
/// A loader is single-use: the pass runs once, and the states and load order
/// it leaves behind describe that run.
#[derive(Debug, Default)]
pub struct PackageLoader {
    states: BTreeMap<String, PackageState>,
    load_order: Vec<String>,
    started: bool,
}

impl PackageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the enabled packages of `catalog` and load them in order.
    ///
    /// For each package: load its config stores, run its registration entry
    /// points, call `load()`, then fire `package_loaded`. After the last one,
    /// `after_all_packages_loaded` fires once. The first failure stops the
    /// pass; resolution failures happen before any package is touched.
    pub fn load_all(&mut self, catalog: &PackageCatalog, app: &mut Application) -> Result<Vec<String>> {
        if self.started {
            return Err(PackagingError::AlreadyLoaded.into());
        }
        self.started = true;

        let ordered = dependency::resolve(&catalog.descriptors())?;
        log::info!(
            "Resolved load order: [{}]",
            ordered.iter().map(|d| d.name()).collect::<Vec<_>>().join(", ")
        );

        for descriptor in &ordered {
            self.states.insert(descriptor.name().to_string(), PackageState::Pending);
        }

        for descriptor in &ordered {
            let package = catalog
                .get(descriptor.name())
                .ok_or_else(|| PackagingError::PackageNotFound(descriptor.name().to_string()))?;

            if let Err(e) = self.load_package(descriptor, package, app) {
                self.states.insert(descriptor.name().to_string(), PackageState::Failed);
                log::error!("Bootstrap aborted: {}", e);
                return Err(e);
            }
        }

        let order = &self.load_order;
        app.hooks()
            .dispatch::<dyn PackagingHook, _>(AFTER_ALL_PACKAGES_LOADED, |hook| {
                hook.after_all_packages_loaded(order)
            })?;

        log::info!("All {} packages loaded", self.load_order.len());
        Ok(self.load_order.clone())
    }

    fn load_package(
        &mut self,
        descriptor: &PackageDescriptor,
        package: &dyn Package,
        app: &mut Application,
    ) -> Result<()> {
        let name = descriptor.name();
        log::debug!("Loading package '{}'", name);

        for section in descriptor.config_store_names() {
            app.load_config(section)
                .map_err(|e| fail(name, LoadStage::Config { section: section.clone() }, e))?;
        }
        self.states.insert(name.to_string(), PackageState::ConfigLoaded);

        let declared = descriptor.component_key();
        let previous = declared.and_then(|key| app.components().revision(key));
        package
            .register_components(app.components_mut())
            .map_err(|e| fail(name, LoadStage::ModuleInit, e))?;
        if let Some(key) = declared {
            // The package itself must have bound the key, not an earlier one.
            let current = app.components().revision(key);
            if current.is_none() || current == previous {
                let missing = PackagingError::MissingDeclaredComponent {
                    package: name.to_string(),
                    key: key.clone(),
                };
                return Err(fail(name, LoadStage::ModuleInit, missing.into()));
            }
        }
        package
            .register_hooks(app.hooks_mut())
            .map_err(|e| fail(name, LoadStage::ModuleInit, e))?;

        package.load(app).map_err(|e| fail(name, LoadStage::Load, e))?;
        self.states.insert(name.to_string(), PackageState::Loaded);

        app.hooks()
            .dispatch::<dyn PackagingHook, _>(PACKAGE_LOADED, |hook| hook.package_loaded(name))
            .map_err(|e| fail(name, LoadStage::Hook { event: PACKAGE_LOADED }, e))?;
        self.load_order.push(name.to_string());

        log::info!("Loaded package '{}'", name);
        Ok(())
    }

    pub fn state(&self, name: &str) -> Option<PackageState> {
        self.states.get(name).copied()
    }

    /// Packages that loaded and passed their `package_loaded` hooks, in order
    pub fn load_order(&self) -> &[String] {
        &self.load_order
    }
}

fn fail(package: &str, stage: LoadStage, source: Error) -> Error {
    PackagingError::load_failed(package, stage, source).into()
}
