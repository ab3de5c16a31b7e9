//! The readiness gate.

use crate::hooks::Hook;
use crate::host::LifecycleHost;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// A one-way latch that opens on the first configured signal.
///
/// Signals are alternatives: any one of them having fired, or firing right now,
/// opens the gate. Failing that, the `sprout/ready` hook may force it open.
/// Once open, the gate never consults the host or the hook again.
#[derive(Debug)]
pub struct ReadinessGate {
    signals: Vec<String>,
    open: AtomicBool,
}

impl ReadinessGate {
    pub fn new(signals: Vec<String>) -> Self {
        Self {
            signals,
            open: AtomicBool::new(false),
        }
    }

    pub fn signals(&self) -> &[String] {
        &self.signals
    }

    /// The latched state, without checking anything.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Checks the host and the override hook, latching open on success.
    pub fn check(&self, host: &dyn LifecycleHost, force: &Hook<bool>) -> bool {
        if self.is_open() {
            return true;
        }

        let ready = match self
            .signals
            .iter()
            .find(|signal| host.did_fire(signal) || host.is_firing(signal))
        {
            Some(signal) => {
                debug!(%signal, "Signal observed");
                true
            }
            None => force.apply(false),
        };

        if ready {
            self.open.store(true, Ordering::Release);
            info!("Gate opened");
        }
        ready
    }
}
