//! # Host Dispatcher
//!
//! An actor that owns an [`EventHost`] and fires signals from a single Tokio task.
//!
//! Signals sent through a [`HostClient`] queue up on an mpsc channel and are
//! dispatched strictly one after another, so every listener, including the
//! bootloader, sees a single logical thread of control no matter how many tasks
//! hold a client. Results come back over a oneshot channel.

use super::EventHost;
use crate::error::{BootError, BootResult};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Requests the dispatcher understands.
#[derive(Debug)]
pub enum HostRequest {
    Fire {
        signal: String,
        respond_to: oneshot::Sender<BootResult<()>>,
    },
    FiredCount {
        signal: String,
        respond_to: oneshot::Sender<usize>,
    },
}

/// The server half: owns the host and the receiving end of the channel.
pub struct HostDispatcher {
    receiver: mpsc::Receiver<HostRequest>,
    host: Arc<EventHost>,
}

impl HostDispatcher {
    pub fn new(host: Arc<EventHost>, buffer_size: usize) -> (Self, HostClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        (Self { receiver, host }, HostClient::new(sender))
    }

    /// Creates the dispatcher and spawns it on the current runtime.
    pub fn spawn(host: Arc<EventHost>, buffer_size: usize) -> (HostClient, JoinHandle<()>) {
        let (dispatcher, client) = Self::new(host, buffer_size);
        (client, tokio::spawn(dispatcher.run()))
    }

    /// Processes requests until every client is dropped.
    pub async fn run(mut self) {
        info!("Host dispatcher started");
        let mut dispatched = 0usize;

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                HostRequest::Fire { signal, respond_to } => {
                    debug!(%signal, "Fire");
                    let result = self.host.fire(&signal);
                    dispatched += 1;
                    match &result {
                        Ok(()) => debug!(%signal, "Fire ok"),
                        Err(e) => warn!(%signal, error = %e, "Fire failed"),
                    }
                    let _ = respond_to.send(result);
                }
                HostRequest::FiredCount { signal, respond_to } => {
                    let _ = respond_to.send(self.host.fired_count(&signal));
                }
            }
        }

        info!(dispatched, "Host dispatcher stopped");
    }
}

/// Cloneable handle for sending signals to a [`HostDispatcher`].
#[derive(Clone)]
pub struct HostClient {
    sender: mpsc::Sender<HostRequest>,
}

impl HostClient {
    pub fn new(sender: mpsc::Sender<HostRequest>) -> Self {
        Self { sender }
    }

    /// Fires `signal` and waits for every listener to finish.
    pub async fn fire(&self, signal: impl Into<String>) -> BootResult<()> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(HostRequest::Fire { signal: signal.into(), respond_to })
            .await
            .map_err(|_| BootError::Host("dispatcher closed".into()))?;
        response
            .await
            .map_err(|_| BootError::Host("dispatcher dropped response channel".into()))?
    }

    /// Drops this client and waits for the dispatcher task to finish. The task
    /// only stops once every clone of the client is gone.
    pub async fn shutdown(self, handle: JoinHandle<()>) -> BootResult<()> {
        drop(self.sender);
        handle
            .await
            .map_err(|e| BootError::Host(format!("dispatcher task failed: {e}")))
    }

    pub async fn fired_count(&self, signal: impl Into<String>) -> BootResult<usize> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(HostRequest::FiredCount { signal: signal.into(), respond_to })
            .await
            .map_err(|_| BootError::Host("dispatcher closed".into()))?;
        response
            .await
            .map_err(|_| BootError::Host("dispatcher dropped response channel".into()))
    }
}
