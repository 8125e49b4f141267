use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::kernel::constants::DEFAULT_COMPONENT_KEY;
use crate::kernel::error::ComponentError;

/// Identity of a registered component: the owning name plus a sub-key.
///
/// The sub-key lets one package expose several services of the same kind,
/// e.g. one per database bind. It defaults to [`DEFAULT_COMPONENT_KEY`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKey {
    name: String,
    sub_key: String,
}

impl ComponentKey {
    /// Key with the default sub-key
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sub_key: DEFAULT_COMPONENT_KEY.to_string(),
        }
    }

    /// Key with an explicit sub-key
    pub fn with_sub_key(name: impl Into<String>, sub_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sub_key: sub_key.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sub_key(&self) -> &str {
        &self.sub_key
    }

    pub fn is_default(&self) -> bool {
        self.sub_key == DEFAULT_COMPONENT_KEY
    }

    /// The same name under the default sub-key
    pub fn to_default(&self) -> Self {
        Self::new(self.name.clone())
    }

    fn validate(&self) -> Result<(), ComponentError> {
        if self.name.trim().is_empty() {
            return Err(ComponentError::InvalidComponentName);
        }
        Ok(())
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}[{}]", self.name, self.sub_key)
        }
    }
}

impl From<&str> for ComponentKey {
    fn from(name: &str) -> Self {
        ComponentKey::new(name)
    }
}

impl From<String> for ComponentKey {
    fn from(name: String) -> Self {
        ComponentKey::new(name)
    }
}

/// A bound instance. The `Arc<T>` is boxed as `Any` so that unsized service
/// traits (`Arc<dyn CacheManager>`) can be stored and handed back unchanged.
struct ComponentEntry {
    instance: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
    revision: u64,
}

impl ComponentEntry {
    fn new<T>(instance: Arc<T>, revision: u64) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self {
            instance: Box::new(instance),
            type_name: type_name::<T>(),
            revision,
        }
    }
}

/// Keyed store of singleton service instances.
///
/// Mutation needs `&mut self`, so once the application hands out shared
/// references after bootstrap, lookups run without locking and no writer can
/// interleave with them.
#[derive(Default)]
pub struct ComponentRegistry {
    instances: HashMap<ComponentKey, ComponentEntry>,
    next_revision: u64,
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

impl ComponentRegistry {
    /// Create a new empty component registry
    pub fn new() -> Self {
        Self {
            instances: HashMap::new(),
            next_revision: 0,
        }
    }

    /// Bind `instance` under `key`.
    ///
    /// Without `replace`, an already bound key is a [`ComponentError::DuplicateComponent`]
    /// and the existing binding is left untouched. With `replace`, the previous
    /// instance is dropped and the new one takes its place.
    pub fn register<T>(
        &mut self,
        key: impl Into<ComponentKey>,
        instance: Arc<T>,
        replace: bool,
    ) -> Result<(), ComponentError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = key.into();
        key.validate()?;

        let entry = ComponentEntry::new(instance, self.next_revision);
        match self.instances.get(&key) {
            Some(_) if !replace => return Err(ComponentError::DuplicateComponent { key }),
            Some(old) => {
                log::warn!(
                    "Component '{}' ({}) is going to be replaced by {}",
                    key,
                    old.type_name,
                    entry.type_name
                );
            }
            None => log::debug!("Registering component '{}' ({})", key, entry.type_name),
        }
        self.instances.insert(key, entry);
        self.next_revision += 1;
        Ok(())
    }

    /// Look up the instance bound under `key`.
    pub fn get<T>(&self, key: impl Into<ComponentKey>) -> Result<Arc<T>, ComponentError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = key.into();
        key.validate()?;

        let entry = self
            .instances
            .get(&key)
            .ok_or_else(|| ComponentError::ComponentNotFound { key: key.clone() })?;

        entry
            .instance
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or_else(|| ComponentError::TypeMismatch {
                key,
                requested: type_name::<T>(),
                actual: entry.type_name,
            })
    }

    /// Look up `(name, sub_key)`, falling back to `(name, default)` when the
    /// custom binding does not exist.
    pub fn get_or_default<T>(&self, name: &str, sub_key: &str) -> Result<Arc<T>, ComponentError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let custom = ComponentKey::with_sub_key(name, sub_key);
        if self.instances.contains_key(&custom) {
            return self.get(custom);
        }
        self.get(custom.to_default())
    }

    /// Check whether `key` is bound
    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.instances.contains_key(key)
    }

    /// Revision of the binding under `key`. Every successful
    /// [`register`](Self::register) gets a fresh one, replacements included.
    pub fn revision(&self, key: &ComponentKey) -> Option<u64> {
        self.instances.get(key).map(|entry| entry.revision)
    }

    /// Unbind `key`. The instance is dropped once its last `Arc` goes away.
    pub fn remove(&mut self, key: impl Into<ComponentKey>) -> Result<(), ComponentError> {
        let key = key.into();
        match self.instances.remove(&key) {
            Some(_) => {
                log::debug!("Removed component '{}'", key);
                Ok(())
            }
            None => Err(ComponentError::ComponentNotFound { key }),
        }
    }

    /// All bound keys, sorted
    pub fn keys(&self) -> Vec<ComponentKey> {
        let mut keys: Vec<ComponentKey> = self.instances.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Clear all bindings.
    pub fn reset(&mut self) {
        self.instances.clear();
    }
}
