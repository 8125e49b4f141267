#![cfg(test)]

use std::sync::{Arc, Mutex};

use crate::hooks::HookRegistry;
use crate::kernel::bootstrap::Application;
use crate::kernel::component::{ComponentKey, ComponentRegistry};
use crate::kernel::error::{Error, Result};
use crate::packaging::{Package, PackageCatalog, PackageDescriptor, PackagingHook};
use crate::storage::config::{ConfigStore, MemoryConfigStore};

/// Shared, ordered record of what happened during a bootstrap
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Service shape used by test packages
pub trait Greeter: Send + Sync {
    fn greeting(&self) -> String;
}

pub struct NamedGreeter(pub String);

impl Greeter for NamedGreeter {
    fn greeting(&self) -> String {
        format!("hello from {}", self.0)
    }
}

/// Packaging hook that logs every event under its owner's name
pub struct RecordingHook {
    owner: String,
    log: EventLog,
    fail_on: Option<String>,
}

impl PackagingHook for RecordingHook {
    fn package_loaded(&self, name: &str) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("package_loaded:{}:{}", self.owner, name));
        if self.fail_on.as_deref() == Some(name) {
            return Err(Error::Other(format!("{} refused {}", self.owner, name)));
        }
        Ok(())
    }

    fn after_all_packages_loaded(&self, order: &[String]) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(format!("after_all:{}:{}", self.owner, order.join(",")));
        Ok(())
    }
}

/// Configurable package used across the bootstrap tests
pub struct TestPackage {
    descriptor: PackageDescriptor,
    log: EventLog,
    component: Option<(ComponentKey, bool)>,
    observe: bool,
    fail_hook_on: Option<String>,
    fail_load: bool,
}

impl TestPackage {
    pub fn new(descriptor: PackageDescriptor, log: &EventLog) -> Self {
        Self {
            descriptor,
            log: log.clone(),
            component: None,
            observe: false,
            fail_hook_on: None,
            fail_load: false,
        }
    }

    /// Bind a [`NamedGreeter`] under `key` during registration
    pub fn registering(mut self, key: impl Into<ComponentKey>, replace: bool) -> Self {
        self.component = Some((key.into(), replace));
        self
    }

    /// Install a [`RecordingHook`]
    pub fn observing(mut self) -> Self {
        self.observe = true;
        self
    }

    /// Install a [`RecordingHook`] that fails when `package` is loaded
    pub fn failing_hook_on(mut self, package: &str) -> Self {
        self.observe = true;
        self.fail_hook_on = Some(package.to_string());
        self
    }

    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }
}

impl Package for TestPackage {
    fn descriptor(&self) -> &PackageDescriptor {
        &self.descriptor
    }

    fn register_components(&self, components: &mut ComponentRegistry) -> Result<()> {
        if let Some((key, replace)) = &self.component {
            let greeter: Arc<dyn Greeter> = Arc::new(NamedGreeter(self.name().to_string()));
            components.register(key.clone(), greeter, *replace)?;
        }
        Ok(())
    }

    fn register_hooks(&self, hooks: &mut HookRegistry) -> Result<()> {
        if self.observe {
            hooks.register::<dyn PackagingHook>(
                self.name(),
                Arc::new(RecordingHook {
                    owner: self.name().to_string(),
                    log: self.log.clone(),
                    fail_on: self.fail_hook_on.clone(),
                }),
            )?;
        }
        Ok(())
    }

    fn load(&self, _app: &mut Application) -> Result<()> {
        self.log.lock().unwrap().push(format!("load:{}", self.name()));
        if self.fail_load {
            return Err(Error::Other(format!("{} could not start", self.name())));
        }
        Ok(())
    }
}

pub fn catalog_of(packages: Vec<TestPackage>) -> PackageCatalog {
    let mut catalog = PackageCatalog::new();
    for package in packages {
        catalog.add(Box::new(package)).expect("failed to add test package");
    }
    catalog
}

pub fn test_app() -> Application {
    test_app_with(MemoryConfigStore::new())
}

pub fn test_app_with(store: impl ConfigStore + 'static) -> Application {
    Application::new(Arc::new(store)).scripting(true)
}

/// Names of the `load:` events, in order
pub fn loads(log: &EventLog) -> Vec<String> {
    events(log)
        .into_iter()
        .filter_map(|e| e.strip_prefix("load:").map(String::from))
        .collect()
}
