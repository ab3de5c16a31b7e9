//! Deferred calls and the buffer that holds them until boot.

use crate::application::{Application, ProviderId};
use crate::error::{AppError, BootError, BootResult};
use std::collections::VecDeque;
use std::fmt;
use tracing::warn;

/// A callback run with the live application.
pub type Callback<A> = Box<dyn FnOnce(&A) -> Result<(), AppError> + Send>;

/// Work submitted through the bootloader.
pub enum Deferred<A> {
    /// Register a service provider, optionally forcing re-registration.
    Register { provider: ProviderId, force: bool },
    /// Run an arbitrary callback.
    Call(Callback<A>),
}

impl<A: Application> Deferred<A> {
    pub fn register(provider: ProviderId, force: bool) -> Self {
        Deferred::Register { provider, force }
    }

    pub fn call<F, E>(callback: F) -> Self
    where
        F: FnOnce(&A) -> Result<(), E> + Send + 'static,
        E: Into<AppError>,
    {
        Deferred::Call(Box::new(move |app: &A| callback(app).map_err(Into::<AppError>::into)))
    }

    /// Runs the work against `app`.
    pub fn run(self, app: &A) -> BootResult<()> {
        match self {
            Deferred::Register { provider, force } => app
                .register(&provider, force)
                .map_err(|e| BootError::Register {
                    provider,
                    source: BootError::application(e),
                }),
            Deferred::Call(callback) => callback(app).map_err(BootError::Callback),
        }
    }
}

impl<A> fmt::Debug for Deferred<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deferred::Register { provider, force } => f
                .debug_struct("Register")
                .field("provider", provider)
                .field("force", force)
                .finish(),
            Deferred::Call(_) => f.write_str("Call(..)"),
        }
    }
}

/// FIFO buffer of deferred work.
///
/// The buffer is drained once, when the gate opens. If an entry fails, whatever
/// is still queued behind it is discarded: this is a boot queue, not a job queue.
pub struct DeferredQueue<A> {
    items: VecDeque<Deferred<A>>,
}

impl<A> DeferredQueue<A> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn push(&mut self, item: Deferred<A>) {
        self.items.push_back(item);
    }

    pub fn pop(&mut self) -> Option<Deferred<A>> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drops everything still queued after `source` failed.
    pub fn abandon(&mut self, source: BootError) -> BootError {
        let discarded = self.items.len();
        self.items.clear();
        warn!(error = %source, discarded, "Deferred call failed, queue cleared");
        BootError::Drain {
            source: Box::new(source),
            discarded,
        }
    }
}

impl<A> Default for DeferredQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}
