//! # Sprout
//!
//! > **Boot an application inside a host you do not control.**
//!
//! Sprout is the startup orchestrator for an application embedded in a host
//! (a CMS, a plugin runtime, an editor) whose lifecycle it only observes. The
//! host fires named lifecycle signals at points Sprout cannot predict; Sprout
//! waits for the first one that matters, builds the application exactly once,
//! runs its bootstrap phases, and then replays everything callers asked for in
//! the meantime, in order, exactly once.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Nothing Global
//!
//! The host surface ([`host::LifecycleHost`]), environment access
//! ([`config::Environment`]), theme lookups ([`paths::ThemeLayout`]) and the
//! extension points ([`hooks::Hooks`]) are all handed to the bootloader when it
//! is built. A test can stand up the whole boot sequence with in-memory fakes.
//!
//! ### One Latch, One Build, One Drain
//!
//! - The [`ReadinessGate`](boot::ReadinessGate) opens once and never closes.
//! - The application is constructed at most once; a failed bootstrap is terminal.
//! - The [`DeferredQueue`](boot::DeferredQueue) is drained once, oldest first.
//!   After that, `register` and `call` dispatch immediately.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Orchestrator ([`boot`])
//! - **Role**: Subscribes to the host, opens the gate, builds, bootstraps, drains.
//! - **Key items**: [`Bootloader`](boot::Bootloader), [`BootstrapPipeline`](boot::BootstrapPipeline).
//!
//! ### 2. The Contract ([`application`])
//! - **Role**: What an application must provide to be booted.
//! - **Key items**: [`Application`](application::Application).
//!
//! ### 3. The Filesystem ([`paths`])
//! - **Role**: Finds the base path and the `app`/`config`/`storage`/`resources` directories.
//! - **Key items**: [`PathResolver`](paths::PathResolver), [`Role`](paths::Role).
//!
//! ### 4. The Host ([`host`])
//! - **Role**: Signal registry and a Tokio dispatcher actor that fires signals sequentially.
//! - **Key items**: [`EventHost`](host::EventHost), [`HostDispatcher`](host::HostDispatcher).
//!
//! ### 5. Extension Points ([`hooks`]) and Configuration ([`config`])
//! - **Role**: Named filters over computed values; serde-friendly construction parameters.
//!
//! ## 🚀 Quick Start
//!
//! ```
//! use sprout::boot::{BootStage, Bootloader};
//! use sprout::config::{BootConfig, MapEnv};
//! use sprout::host::EventHost;
//! use sprout::mock::RecordingApplication;
//! use std::sync::Arc;
//!
//! let host = Arc::new(EventHost::new());
//! let boot = Bootloader::<RecordingApplication>::builder(BootConfig::default(), host.clone())
//!     .env(Arc::new(MapEnv::new()))
//!     .build()
//!     .unwrap();
//!
//! boot.register("cache", false).unwrap();
//! assert_eq!(boot.queued(), 1);
//!
//! host.fire("after_setup_theme").unwrap();
//! assert_eq!(boot.stage(), BootStage::Ready);
//! assert_eq!(boot.application().unwrap().providers().len(), 1);
//! ```
//!
//! ### Running the Demo
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```
//!
//! ## 👩‍💻 Observability
//!
//! Every step is traced with structured fields. See [`runtime::tracing`].

pub mod application;
pub mod boot;
pub mod config;
pub mod error;
pub mod hooks;
pub mod host;
pub mod mock;
pub mod paths;
pub mod runtime;

pub use application::{Application, ProviderId};
pub use boot::{BootStage, Bootloader};
pub use error::{BootError, BootResult};
