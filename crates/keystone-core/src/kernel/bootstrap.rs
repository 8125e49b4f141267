use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use crate::hooks::HookRegistry;
use crate::kernel::component::{ComponentKey, ComponentRegistry};
use crate::kernel::constants;
use crate::kernel::context::ApplicationContext;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::kernel::hooks::{
    AFTER_APPLICATION_LOADED, APPLICATION_INITIALIZED, APPLICATION_STATUS_CHANGED, ApplicationHook,
    BEFORE_APPLICATION_RUN,
};
use crate::packaging::catalog::PackageCatalog;
use crate::packaging::loader::PackageLoader;
use crate::storage::config::{ConfigData, ConfigStore, FileConfigStore};
use crate::storage::error::StorageSystemError;
use crate::storage::local::LocalStorageProvider;

/// Lifecycle status of an [`Application`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicationStatus {
    Initializing,
    Loading,
    Ready,
    Running,
    Terminated,
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            ApplicationStatus::Initializing => "initializing",
            ApplicationStatus::Loading => "loading",
            ApplicationStatus::Ready => "ready",
            ApplicationStatus::Running => "running",
            ApplicationStatus::Terminated => "terminated",
        };
        f.write_str(status)
    }
}

/// The application context every package is loaded into.
///
/// Owns the component registry, the hook registry, the shared context values
/// and the config sections read during bootstrap. Nothing here is global:
/// tests build as many applications as they like.
#[derive(Debug)]
pub struct Application {
    status: ApplicationStatus,
    scripting_mode: bool,
    components: ComponentRegistry,
    hooks: HookRegistry,
    context: ApplicationContext,
    config_store: Arc<dyn ConfigStore>,
    configs: HashMap<String, ConfigData>,
    loaded_packages: Vec<String>,
}

impl Application {
    /// Creates a new application reading config stores from `config_store`.
    pub fn new(config_store: Arc<dyn ConfigStore>) -> Self {
        log::info!("Initializing {} v{}", constants::APP_NAME, constants::APP_VERSION);
        Application {
            status: ApplicationStatus::Initializing,
            scripting_mode: false,
            components: ComponentRegistry::new(),
            hooks: HookRegistry::new(),
            context: ApplicationContext::new(),
            config_store,
            configs: HashMap::new(),
            loaded_packages: Vec::new(),
        }
    }

    /// Creates a new application reading config store files from `dir`.
    pub fn with_settings_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        log::info!("Using settings directory: {}", dir.display());
        let provider = Arc::new(LocalStorageProvider::new(dir));
        Self::new(Arc::new(FileConfigStore::new(provider, PathBuf::new())))
    }

    /// An application in scripting mode is bootstrapped but never run.
    pub fn scripting(mut self, scripting_mode: bool) -> Self {
        self.scripting_mode = scripting_mode;
        self
    }

    pub fn is_scripting_mode(&self) -> bool {
        self.scripting_mode
    }

    pub fn status(&self) -> ApplicationStatus {
        self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status == ApplicationStatus::Ready
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.components
    }

    /// Gets the component bound under `key`.
    pub fn get_component<T>(&self, key: impl Into<ComponentKey>) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Ok(self.components.get(key)?)
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    pub fn context(&self) -> &ApplicationContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ApplicationContext {
        &mut self.context
    }

    pub fn config_store(&self) -> &Arc<dyn ConfigStore> {
        &self.config_store
    }

    /// A config section loaded during bootstrap.
    pub fn config(&self, name: &str) -> Result<&ConfigData> {
        self.configs.get(name).ok_or_else(|| {
            StorageSystemError::ConfigNotFound {
                name: name.to_string(),
            }
            .into()
        })
    }

    /// Load config store `name`, reading it from the store only the first time.
    pub fn load_config(&mut self, name: &str) -> Result<&ConfigData> {
        if !self.configs.contains_key(name) {
            let data = self.config_store.load_section(name)?;
            log::debug!("Loaded config store '{}' ({} keys)", name, data.len());
            self.configs.insert(name.to_string(), data);
        }
        self.config(name)
    }

    /// Packages loaded by [`load`](Self::load), in load order
    pub fn loaded_packages(&self) -> &[String] {
        &self.loaded_packages
    }

    /// Bootstrap: run the package pass over `catalog` and become ready.
    ///
    /// Only valid while initializing. On failure the application never
    /// reaches [`ApplicationStatus::Ready`].
    pub fn load(&mut self, catalog: &PackageCatalog) -> Result<()> {
        self.expect_status(KernelLifecyclePhase::Load, ApplicationStatus::Initializing)?;
        self.set_status(ApplicationStatus::Loading)?;

        let mut loader = PackageLoader::new();
        self.loaded_packages = loader.load_all(catalog, self)?;

        self.hooks
            .dispatch::<dyn ApplicationHook, _>(AFTER_APPLICATION_LOADED, |hook| {
                hook.after_application_loaded(self)
            })?;
        self.hooks
            .dispatch::<dyn ApplicationHook, _>(APPLICATION_INITIALIZED, |hook| {
                hook.application_initialized(self)
            })?;

        self.set_status(ApplicationStatus::Ready)?;
        self.hooks.seal();
        log::info!("{} is ready ({} packages)", constants::APP_NAME, self.loaded_packages.len());
        Ok(())
    }

    /// Run until Ctrl-C, then terminate.
    pub async fn run(&mut self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for Ctrl-C: {}", e);
            }
        })
        .await
    }

    /// Run until `shutdown` completes, then terminate.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        if self.scripting_mode {
            return Err(Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Run,
                message: "application is in scripting mode and cannot be run".to_string(),
                source: None,
            });
        }
        self.expect_status(KernelLifecyclePhase::Run, ApplicationStatus::Ready)?;

        self.hooks
            .dispatch::<dyn ApplicationHook, _>(BEFORE_APPLICATION_RUN, |hook| {
                hook.before_application_run(self)
            })?;
        self.set_status(ApplicationStatus::Running)?;
        log::info!("{} is running", constants::APP_NAME);

        shutdown.await;

        log::info!("Shutdown requested");
        self.terminate()
    }

    /// Move to [`ApplicationStatus::Terminated`]. Terminating twice is a no-op.
    pub fn terminate(&mut self) -> Result<()> {
        match self.status {
            ApplicationStatus::Terminated => Ok(()),
            ApplicationStatus::Initializing | ApplicationStatus::Loading => Err(Error::invalid_status(
                KernelLifecyclePhase::Terminate,
                self.status,
                ApplicationStatus::Ready,
            )),
            _ => self.set_status(ApplicationStatus::Terminated),
        }
    }

    /// Drop every component, hook, context value and cached config section
    /// and go back to initializing.
    pub fn reset(&mut self) {
        log::debug!("Resetting application");
        self.components.reset();
        self.hooks.clear();
        self.context.clear();
        self.configs.clear();
        self.loaded_packages.clear();
        self.status = ApplicationStatus::Initializing;
    }

    fn expect_status(&self, phase: KernelLifecyclePhase, expected: ApplicationStatus) -> Result<()> {
        if self.status != expected {
            return Err(Error::invalid_status(phase, self.status, expected));
        }
        Ok(())
    }

    fn set_status(&mut self, new: ApplicationStatus) -> Result<()> {
        let old = self.status;
        if old == new {
            return Ok(());
        }
        // The new status only takes effect once every hook accepted it.
        self.hooks
            .dispatch::<dyn ApplicationHook, _>(APPLICATION_STATUS_CHANGED, |hook| {
                hook.application_status_changed(old, new)
            })?;
        self.status = new;
        log::debug!("Application status changed: {} -> {}", old, new);
        Ok(())
    }
}
