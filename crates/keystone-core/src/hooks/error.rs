//! # Keystone Hook System Errors
//!
//! Defines [`HookError`], raised when a hook cannot be registered or when a
//! dispatched callback fails. A failing callback carries the hook kind, the
//! event, the package that registered the hook and its position in the
//! dispatch order, so a broken bootstrap can be traced to a single hook.
use thiserror::Error;

use crate::kernel::error::Error;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("Hook '{event}' of kind '{kind}' registered by '{owner}' (position {position}) failed: {source}")]
    CallbackFailed {
        kind: &'static str,
        event: &'static str,
        owner: String,
        position: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("Cannot register a '{kind}' hook for '{owner}': the hook registry is sealed")]
    RegistrySealed { kind: &'static str, owner: String },
}

impl HookError {
    /// Package the offending hook belongs to.
    pub fn owner(&self) -> &str {
        match self {
            HookError::CallbackFailed { owner, .. } | HookError::RegistrySealed { owner, .. } => owner,
        }
    }
}
