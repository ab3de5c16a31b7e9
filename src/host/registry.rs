//! In-memory lifecycle host.

use super::{LifecycleHost, Listener};
use crate::error::BootResult;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use tracing::{debug, warn};

struct Subscription {
    priority: i32,
    listener: Listener,
}

/// A synchronous signal registry.
///
/// Listeners run in ascending priority; equal priorities keep subscription order.
/// A signal counts as fired from the moment its dispatch starts, and as firing
/// until the last listener returns. The first listener error stops the dispatch
/// and is returned to the caller of [`EventHost::fire`].
#[derive(Default)]
pub struct EventHost {
    listeners: RwLock<HashMap<String, Vec<Subscription>>>,
    fired: Mutex<HashMap<String, usize>>,
    firing: Mutex<Vec<String>>,
}

impl EventHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatches `signal` to every subscribed listener.
    pub fn fire(&self, signal: &str) -> BootResult<()> {
        *self.fired.lock().entry(signal.to_string()).or_insert(0) += 1;

        // Snapshot so listeners may subscribe (or fire) without holding the lock.
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .get(signal)
            .map(|subs| subs.iter().map(|s| s.listener.clone()).collect())
            .unwrap_or_default();
        debug!(signal, listeners = listeners.len(), "Firing signal");

        self.firing.lock().push(signal.to_string());
        let result = listeners.iter().try_for_each(|listener| listener());
        self.end_firing(signal);

        if let Err(e) = &result {
            warn!(signal, error = %e, "Listener failed");
        }
        result
    }

    /// How many times `signal` has fired.
    pub fn fired_count(&self, signal: &str) -> usize {
        self.fired.lock().get(signal).copied().unwrap_or(0)
    }

    pub fn listener_count(&self, signal: &str) -> usize {
        self.listeners.read().get(signal).map_or(0, Vec::len)
    }

    fn end_firing(&self, signal: &str) {
        let mut firing = self.firing.lock();
        if let Some(pos) = firing.iter().rposition(|s| s == signal) {
            firing.remove(pos);
        }
    }
}

impl LifecycleHost for EventHost {
    fn did_fire(&self, signal: &str) -> bool {
        self.fired_count(signal) > 0
    }

    fn is_firing(&self, signal: &str) -> bool {
        self.firing.lock().iter().any(|s| s == signal)
    }

    fn subscribe(&self, signal: &str, priority: i32, listener: Listener) {
        let mut listeners = self.listeners.write();
        let subs = listeners.entry(signal.to_string()).or_default();
        // Insert after every subscription with priority <= ours.
        let pos = subs.partition_point(|s| s.priority <= priority);
        subs.insert(pos, Subscription { priority, listener });
        debug!(signal, priority, "Listener subscribed");
    }
}
