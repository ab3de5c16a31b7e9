//! Runtime support for embedding the bootloader.
//!
//! - [`setup_tracing`] / [`try_setup_tracing`] - Initialize the tracing/logging infrastructure

pub mod tracing;

pub use self::tracing::{setup_tracing, try_setup_tracing};
