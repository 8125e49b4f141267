use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::hooks::HookKind;
use crate::hooks::error::HookError;
use crate::kernel::error::Result;

/// A registered hook together with the package that registered it.
struct HookEntry<H: ?Sized> {
    owner: String,
    hook: Arc<H>,
}

/// Ordered hooks of one kind.
struct HookList<H: ?Sized> {
    entries: Vec<HookEntry<H>>,
}

/// Type-erased slot for a [`HookList`], remembering its kind name.
struct KindSlot {
    kind: &'static str,
    list: Box<dyn Any + Send + Sync>,
}

/// Per-kind ordered lists of hook instances.
///
/// A hook kind is a trait object type implementing [`HookKind`], e.g.
/// `dyn PackagingHook`. Registration appends; dispatch walks a kind's list in
/// registration order and stops at the first failing callback.
#[derive(Default)]
pub struct HookRegistry {
    kinds: HashMap<TypeId, KindSlot>,
    sealed: bool,
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&'static str> = self.kinds.values().map(|slot| slot.kind).collect();
        kinds.sort_unstable();
        f.debug_struct("HookRegistry")
            .field("kinds", &kinds)
            .field("sealed", &self.sealed)
            .finish()
    }
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `hook` to the list of kind `H`.
    ///
    /// `owner` names the package registering the hook and shows up in
    /// dispatch errors. Fails once the registry is sealed.
    pub fn register<H>(&mut self, owner: impl Into<String>, hook: Arc<H>) -> std::result::Result<(), HookError>
    where
        H: HookKind + ?Sized,
    {
        let owner = owner.into();
        if self.sealed {
            return Err(HookError::RegistrySealed { kind: H::KIND, owner });
        }

        log::debug!("Registering '{}' hook for '{}'", H::KIND, owner);
        self.list_mut::<H>().entries.push(HookEntry { owner, hook });
        Ok(())
    }

    /// Invoke `callback` on every hook of kind `H` in registration order.
    ///
    /// The first error aborts the dispatch and is returned wrapped in
    /// [`HookError::CallbackFailed`]. Returns the number of hooks invoked.
    pub fn dispatch<H, F>(&self, event: &'static str, mut callback: F) -> Result<usize>
    where
        H: HookKind + ?Sized,
        F: FnMut(&H) -> Result<()>,
    {
        let Some(list) = self.list::<H>() else {
            log::trace!("No '{}' hooks registered for '{}'", H::KIND, event);
            return Ok(0);
        };

        for (position, entry) in list.entries.iter().enumerate() {
            if let Err(source) = callback(&*entry.hook) {
                log::error!(
                    "'{}' hook '{}' registered by '{}' failed: {}",
                    H::KIND,
                    event,
                    entry.owner,
                    source
                );
                return Err(HookError::CallbackFailed {
                    kind: H::KIND,
                    event,
                    owner: entry.owner.clone(),
                    position,
                    source: Box::new(source),
                }
                .into());
            }
        }
        Ok(list.entries.len())
    }

    /// Hooks of kind `H`, in registration order
    pub fn hooks<H>(&self) -> impl Iterator<Item = &Arc<H>>
    where
        H: HookKind + ?Sized,
    {
        self.list::<H>()
            .into_iter()
            .flat_map(|list| list.entries.iter().map(|entry| &entry.hook))
    }

    /// Owners of the hooks of kind `H`, in registration order
    pub fn owners<H>(&self) -> Vec<&str>
    where
        H: HookKind + ?Sized,
    {
        self.list::<H>()
            .map(|list| list.entries.iter().map(|entry| entry.owner.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn count<H>(&self) -> usize
    where
        H: HookKind + ?Sized,
    {
        self.list::<H>().map_or(0, |list| list.entries.len())
    }

    /// Names of all kinds with at least one registration, sorted
    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<&'static str> = self.kinds.values().map(|slot| slot.kind).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Reject any further registration.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Drop every hook and unseal.
    pub fn clear(&mut self) {
        self.kinds.clear();
        self.sealed = false;
    }

    fn list<H>(&self) -> Option<&HookList<H>>
    where
        H: HookKind + ?Sized,
    {
        self.kinds
            .get(&TypeId::of::<H>())
            .and_then(|slot| slot.list.downcast_ref::<HookList<H>>())
    }

    fn list_mut<H>(&mut self) -> &mut HookList<H>
    where
        H: HookKind + ?Sized,
    {
        let slot = self.kinds.entry(TypeId::of::<H>()).or_insert_with(|| KindSlot {
            kind: H::KIND,
            list: Box::new(HookList::<H> { entries: Vec::new() }),
        });
        slot.list
            .downcast_mut::<HookList<H>>()
            .expect("hook slot is keyed by the TypeId of its own list type")
    }
}
