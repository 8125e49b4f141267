//! # core-logging
//!
//! First-party package that routes the `log` facade into a `tracing`
//! subscriber writing to stderr.
//!
//! The filter comes from `RUST_LOG` when set, otherwise from the `level` key
//! of the `logging` config store:
//!
//! ```toml
//! [logging]
//! level = "info"
//! ansi = true
//! with_target = true
//! ```
use std::sync::{Arc, OnceLock};

use keystone_core::hooks::HookRegistry;
use keystone_core::kernel::bootstrap::{Application, ApplicationStatus};
use keystone_core::kernel::component::ComponentRegistry;
use keystone_core::kernel::error::{Error as KernelError, Result as KernelResult};
use keystone_core::kernel::hooks::ApplicationHook;
use keystone_core::packaging::{Package, PackageDescriptor, PackagingHook};
use serde::Deserialize;
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Name of this package
pub const PACKAGE_NAME: &str = "core.logging";

/// Config store holding [`LoggingSettings`]
pub const LOGGING_STORE: &str = "logging";

/// Key the [`LoggingManager`] is registered under
pub const LOGGING_COMPONENT: &str = "core.logging";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    pub ansi: bool,
    pub with_target: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            ansi: true,
            with_target: true,
        }
    }
}

/// Owns the logging settings and installs the global subscriber.
#[derive(Debug, Default)]
pub struct LoggingManager {
    settings: OnceLock<LoggingSettings>,
}

impl LoggingManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the settings. Only the first call has an effect.
    pub fn configure(&self, settings: LoggingSettings) -> bool {
        self.settings.set(settings).is_ok()
    }

    pub fn settings(&self) -> LoggingSettings {
        self.settings.get().cloned().unwrap_or_default()
    }

    /// Filter from `RUST_LOG`, falling back to the configured level.
    pub fn filter(&self) -> KernelResult<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        let level = self.settings().level;
        EnvFilter::try_new(&level)
            .map_err(|e| KernelError::Other(format!("Invalid log level '{}': {}", level, e)))
    }

    /// Install the subscriber and the `log` bridge.
    ///
    /// Returns `false` when a global subscriber was already installed, which
    /// happens when several applications share a process.
    pub fn install(&self) -> KernelResult<bool> {
        let settings = self.settings();
        let subscriber = tracing_subscriber::registry().with(self.filter()?).with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(settings.with_target)
                .with_ansi(settings.ansi),
        );

        if tracing::subscriber::set_global_default(subscriber).is_err() {
            return Ok(false);
        }
        if let Err(e) = LogTracer::init() {
            tracing::warn!("log records will not reach tracing: {}", e);
        }
        Ok(true)
    }
}

/// Logs bootstrap progress
#[derive(Debug, Default)]
pub struct LoggingHooks;

impl PackagingHook for LoggingHooks {
    fn after_all_packages_loaded(&self, order: &[String]) -> KernelResult<()> {
        log::info!("Loaded {} packages: {}", order.len(), order.join(", "));
        Ok(())
    }
}

impl ApplicationHook for LoggingHooks {
    fn application_status_changed(&self, old: ApplicationStatus, new: ApplicationStatus) -> KernelResult<()> {
        log::info!("Application status: {} -> {}", old, new);
        Ok(())
    }
}

pub struct LoggingPackage {
    descriptor: PackageDescriptor,
}

impl Default for LoggingPackage {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingPackage {
    pub fn new() -> Self {
        Self {
            descriptor: PackageDescriptor::new(PACKAGE_NAME)
                .with_config_store(LOGGING_STORE)
                .with_component(LOGGING_COMPONENT),
        }
    }
}

impl Package for LoggingPackage {
    fn descriptor(&self) -> &PackageDescriptor {
        &self.descriptor
    }

    fn register_components(&self, components: &mut ComponentRegistry) -> KernelResult<()> {
        components.register(LOGGING_COMPONENT, Arc::new(LoggingManager::new()), false)?;
        Ok(())
    }

    fn register_hooks(&self, hooks: &mut HookRegistry) -> KernelResult<()> {
        let logging_hooks = Arc::new(LoggingHooks);
        hooks.register::<dyn PackagingHook>(PACKAGE_NAME, logging_hooks.clone())?;
        hooks.register::<dyn ApplicationHook>(PACKAGE_NAME, logging_hooks)?;
        Ok(())
    }

    fn load(&self, app: &mut Application) -> KernelResult<()> {
        let settings: LoggingSettings = app.config(LOGGING_STORE)?.parse()?;
        let manager = app.get_component::<LoggingManager>(LOGGING_COMPONENT)?;
        if !manager.configure(settings) {
            log::debug!("Logging settings were already configured; keeping them");
        }

        if manager.install()? {
            log::info!("Logging initialized (level '{}')", manager.settings().level);
        } else {
            log::debug!("A global subscriber is already installed; keeping it");
        }
        Ok(())
    }
}
