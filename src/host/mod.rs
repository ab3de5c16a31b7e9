//! # Host Integration
//!
//! The bootloader never dispatches lifecycle signals itself. It asks a
//! [`LifecycleHost`] which signals have fired and subscribes to the ones it cares
//! about. Two hosts ship with the crate:
//!
//! - [`EventHost`]: an in-memory, synchronous signal registry.
//! - [`HostDispatcher`]: a Tokio actor that owns an `EventHost` and fires signals
//!   one at a time from its own task, driven through a [`HostClient`].

pub mod dispatcher;
pub mod registry;

pub use dispatcher::{HostClient, HostDispatcher, HostRequest};
pub use registry::EventHost;

use crate::error::BootResult;
use std::sync::Arc;

/// A callback the host runs when a signal fires.
pub type Listener = Arc<dyn Fn() -> BootResult<()> + Send + Sync>;

/// The host's signal surface, as seen by the bootloader.
pub trait LifecycleHost: Send + Sync {
    /// True once `signal` has fired at least once.
    fn did_fire(&self, signal: &str) -> bool;

    /// True while listeners for `signal` are running.
    fn is_firing(&self, signal: &str) -> bool;

    /// Runs `listener` every time `signal` fires. Lower priorities run first.
    fn subscribe(&self, signal: &str, priority: i32, listener: Listener);
}
