use crate::hooks::HookRegistry;
use crate::kernel::bootstrap::Application;
use crate::kernel::component::ComponentRegistry;
use crate::kernel::error::Result;
use crate::packaging::descriptor::PackageDescriptor;

/// A self-contained feature module.
///
/// The loader calls the entry points in this order, each exactly once:
/// [`register_components`](Package::register_components),
/// [`register_hooks`](Package::register_hooks), then [`load`](Package::load).
/// Config stores named by the descriptor are already loaded by then and
/// readable through [`Application::config`].
pub trait Package: Send + Sync {
    fn descriptor(&self) -> &PackageDescriptor;

    /// Bind the package's services.
    fn register_components(&self, _components: &mut ComponentRegistry) -> Result<()> {
        Ok(())
    }

    /// Register the hooks the package observes. Use the package name as owner.
    fn register_hooks(&self, _hooks: &mut HookRegistry) -> Result<()> {
        Ok(())
    }

    /// Package-specific load step.
    fn load(&self, _app: &mut Application) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        self.descriptor().name()
    }
}
