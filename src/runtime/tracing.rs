//! # Observability & Tracing
//!
//! Structured logging for the bootloader, built on `tracing`.
//!
//! ## What Gets Traced
//!
//! - **Wiring**: which signals the bootloader subscribed to, and at what priority
//! - **Gate**: the signal (or override) that opened it
//! - **Paths**: the resolved base path, each role path, and any hook override
//! - **Boot**: construction, the phase list, and completion, under a `boot` span
//!   with a nested `pipeline` span
//! - **Queue**: deferred submissions, the drain count, and failures with the
//!   number of discarded calls
//!
//! ## Usage
//!
//! ```bash
//! # Boot milestones only
//! RUST_LOG=info cargo run
//!
//! # Every deferral, hook application and role lookup
//! RUST_LOG=debug cargo run
//!
//! # Bootloader internals only
//! RUST_LOG=sprout::boot=trace cargo run
//! ```
//!
//! With `RUST_LOG=info` a boot reads:
//!
//! ```text
//! INFO Bootloader subscribed signals=["after_setup_theme", "rest_api_init"] priority=20
//! INFO boot: Gate opened
//! INFO boot: Base path resolved path="/srv/app"
//! INFO boot: Role paths resolved base="/srv/app" resolved=3
//! INFO boot: Constructing application base="/srv/app" roles=3
//! INFO boot:pipeline: Bootstrap complete count=8
//! INFO boot: Application ready drained=2
//! ```

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn subscriber() -> impl SubscriberInitExt {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false) // Spans already say where we are
        .compact()
        .finish()
}

/// Installs the global subscriber. Panics if one is already installed.
pub fn setup_tracing() {
    subscriber().init();
}

/// Installs the global subscriber unless one already exists.
pub fn try_setup_tracing() -> Result<(), TryInitError> {
    subscriber().try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_an_error_not_a_panic() {
        let _ = try_setup_tracing();
        assert!(try_setup_tracing().is_err());
    }
}
