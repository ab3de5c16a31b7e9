//! # Application Contract
//!
//! The `Application` trait is the capability set every application type must
//! provide before a [`Bootloader`](crate::boot::Bootloader) can drive it. The
//! bootloader never looks inside the container: it constructs it once, hands it
//! the bootstrap phases, and forwards provider registrations and callbacks.
//!
//! Because the requirement is a trait bound, a type that lacks the capability
//! set is rejected when the bootloader is constructed, before any code runs:
//!
//! ```compile_fail
//! use sprout::boot::Bootloader;
//! use sprout::config::BootConfig;
//! use sprout::host::EventHost;
//! use std::sync::Arc;
//!
//! struct NotAnApplication;
//!
//! let host = Arc::new(EventHost::new());
//! let _ = Bootloader::<NotAnApplication>::builder(BootConfig::default(), host).build();
//! ```

use crate::boot::BootstrapPhase;
use crate::paths::RolePaths;
use std::fmt;
use std::path::PathBuf;

/// Trait that any application container must implement to be booted.
///
/// # Shared Ownership
/// The application is constructed once and then shared (`Arc`) between the
/// bootloader and every callback it runs, so all methods take `&self`. Containers
/// manage their own interior mutability.
pub trait Application: Send + Sync + 'static {
    /// The error type for this application.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the application from the resolved base path and role paths.
    ///
    /// Role paths may be absent; the application decides whether that is fatal.
    fn new(base_path: PathBuf, paths: RolePaths) -> Result<Self, Self::Error>
    where
        Self: Sized;

    /// Run the given bootstrap phases, in order.
    fn bootstrap_with(&self, phases: &[BootstrapPhase]) -> Result<(), Self::Error>;

    /// Register a service provider. `force` re-registers an already known provider.
    fn register(&self, provider: &ProviderId, force: bool) -> Result<(), Self::Error>;
}

/// Identifier of a service provider, forwarded verbatim to the application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProviderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
