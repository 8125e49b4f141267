use crate::hooks::HookKind;
use crate::kernel::bootstrap::{Application, ApplicationStatus};
use crate::kernel::error::Result;

pub const APPLICATION_STATUS_CHANGED: &str = "application_status_changed";
pub const AFTER_APPLICATION_LOADED: &str = "after_application_loaded";
pub const APPLICATION_INITIALIZED: &str = "application_initialized";
pub const BEFORE_APPLICATION_RUN: &str = "before_application_run";

/// Callbacks fired by the [`Application`] as it moves through its lifecycle.
pub trait ApplicationHook: Send + Sync {
    fn application_status_changed(&self, _old: ApplicationStatus, _new: ApplicationStatus) -> Result<()> {
        Ok(())
    }

    /// The package pass has completed.
    fn after_application_loaded(&self, _app: &Application) -> Result<()> {
        Ok(())
    }

    /// Bootstrap is complete; the application is about to become ready.
    fn application_initialized(&self, _app: &Application) -> Result<()> {
        Ok(())
    }

    /// Fired only when the application is actually run, never in scripting mode.
    fn before_application_run(&self, _app: &Application) -> Result<()> {
        Ok(())
    }
}

impl HookKind for dyn ApplicationHook {
    const KIND: &'static str = "application";
}
