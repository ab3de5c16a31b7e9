//! # Sprout Demo
//!
//! Simulates a host booting an embedded application:
//! 1.  Callers queue a provider and a callback before anything is ready.
//! 2.  The host fires `init`, which the bootloader ignores.
//! 3.  The host fires `after_setup_theme`; the application is built, bootstrapped
//!     and the queue drained.
//! 4.  A late call runs immediately.

use sprout::boot::Bootloader;
use sprout::config::BootConfig;
use sprout::error::AppError;
use sprout::host::{EventHost, HostDispatcher};
use sprout::mock::{Event, RecordingApplication};
use sprout::runtime::setup_tracing;
use std::sync::Arc;
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let host = Arc::new(EventHost::new());
    let boot = Bootloader::<RecordingApplication>::builder(BootConfig::default(), host.clone())
        .build()
        .map_err(|e| e.to_string())?;

    // Work submitted before the host is ready is buffered.
    boot.register("cache", false)
        .and_then(|b| {
            b.call(|app: &RecordingApplication| {
                app.note("configured routes");
                Ok::<_, AppError>(())
            })
        })
        .map_err(|e| e.to_string())?;
    info!(queued = boot.queued(), stage = ?boot.stage(), "Work queued");

    let (client, handle) = HostDispatcher::spawn(host, 16);

    let span = tracing::info_span!("host_startup");
    async {
        for signal in ["init", "after_setup_theme", "rest_api_init"] {
            client.fire(signal).await?;
            info!(signal, stage = ?boot.stage(), "Signal dispatched");
        }
        Ok::<_, sprout::BootError>(())
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    // Booted: this runs right away.
    boot.call(|app: &RecordingApplication| {
        app.note("late call");
        Ok::<_, AppError>(())
    })
    .map_err(|e| e.to_string())?;

    if let Some(app) = boot.application() {
        info!(base = ?app.base_path(), roles = app.paths().len(), "Application booted");
        for event in app.journal().events() {
            match event {
                Event::Constructed { .. } => info!("constructed"),
                Event::Phase(phase) => info!(%phase, "phase"),
                Event::Registered { provider, force } => info!(%provider, force, "registered"),
                Event::Note(note) => info!(%note, "note"),
            }
        }
    }

    client.shutdown(handle).await.map_err(|e| e.to_string())?;

    info!("Demo completed successfully");
    Ok(())
}
