//! # Keystone Kernel
//!
//! The heart of `keystone-core`: the [`Application`](bootstrap::Application)
//! that owns every registry and drives bootstrap, plus the pieces it is built
//! from.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Bootstrap**: [`Application`](bootstrap::Application) runs the package
//!   pass, tracks the [`ApplicationStatus`](bootstrap::ApplicationStatus) and
//!   fires [`ApplicationHook`](hooks::ApplicationHook) callbacks.
//! - **Components**: the [`ComponentRegistry`](component::ComponentRegistry)
//!   of singleton services keyed by [`ComponentKey`](component::ComponentKey).
//! - **Context**: the [`ApplicationContext`](context::ApplicationContext) of
//!   shared values that are not services.
//! - **Error Handling**: the crate-wide [`Error`](error::Error) and `Result`.
pub mod bootstrap;
pub mod component;
pub mod constants;
pub mod context;
pub mod error;
pub mod hooks;

pub use bootstrap::{Application, ApplicationStatus};
pub use component::{ComponentKey, ComponentRegistry};
pub use context::ApplicationContext;
pub use error::{Error, Result};
pub use hooks::ApplicationHook;
