//! # Boot Errors
//!
//! This module defines the error type shared by every part of the bootloader.
//! Application failures are boxed so the orchestrator does not need to know the
//! concrete error type of the application it drives.

use crate::application::ProviderId;
use crate::boot::BootstrapPhase;

/// Boxed error produced by the application or by a user callback.
pub type AppError = Box<dyn std::error::Error + Send + Sync>;

/// Convenience alias used across the crate.
pub type BootResult<T> = Result<T, BootError>;

/// Errors that can occur while configuring, bootstrapping or dispatching.
#[derive(Debug, thiserror::Error)]
pub enum BootError {
    /// The orchestrator was configured with an unusable signal set.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The application constructor refused the resolved paths.
    #[error("Application construction failed: {0}")]
    Construct(#[source] AppError),

    /// One of the bootstrap phases failed. The pipeline does not retry.
    #[error("Bootstrap failed ({} phases): {source}", .phases.len())]
    Bootstrap {
        phases: Vec<BootstrapPhase>,
        #[source]
        source: AppError,
    },

    /// A provider registration was rejected by the application.
    #[error("Provider registration failed for {provider}: {source}")]
    Register {
        provider: ProviderId,
        #[source]
        source: AppError,
    },

    /// A callback passed to `call` returned an error.
    #[error("Callback failed: {0}")]
    Callback(#[source] AppError),

    /// A queued call failed during the flush. Everything queued behind it was
    /// dropped along with the buffer.
    #[error("Deferred call failed, {discarded} queued calls discarded: {source}")]
    Drain {
        #[source]
        source: Box<BootError>,
        discarded: usize,
    },

    /// An earlier bootstrap attempt failed; the orchestrator stays down.
    #[error("Bootstrap previously failed")]
    Aborted,

    /// The host dispatcher is no longer reachable.
    #[error("Host error: {0}")]
    Host(String),
}

impl BootError {
    /// Boxes any application error for use in [`BootError`] variants.
    pub fn application<E>(error: E) -> AppError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Box::new(error)
    }
}
