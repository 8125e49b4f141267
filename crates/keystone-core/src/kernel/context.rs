use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;

use crate::kernel::error::ContextError;

/// Keyed store of application-wide values that are not services.
#[derive(Default)]
pub struct ApplicationContext {
    values: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("ApplicationContext").field("keys", &keys).finish()
    }
}

impl ApplicationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`. An existing key is only overwritten with `replace`.
    pub fn insert<T>(&mut self, key: impl Into<String>, value: T, replace: bool) -> Result<(), ContextError>
    where
        T: Any + Send + Sync,
    {
        let key = key.into();
        if !replace && self.values.contains_key(&key) {
            return Err(ContextError::DuplicateContextKey(key));
        }
        self.values.insert(key, Box::new(value));
        Ok(())
    }

    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Result<&T, ContextError> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ContextError::ContextKeyNotFound(key.to_string()))?;
        value
            .downcast_ref::<T>()
            .ok_or_else(|| ContextError::TypeMismatch {
                key: key.to_string(),
                requested: type_name::<T>(),
            })
    }

    /// Like [`get`](Self::get), but a missing key yields `default`.
    pub fn get_or<'a, T: Any + Send + Sync>(&'a self, key: &str, default: &'a T) -> Result<&'a T, ContextError> {
        match self.get(key) {
            Err(ContextError::ContextKeyNotFound(_)) => Ok(default),
            other => other,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
