//! Bootloader configuration and environment access.

use crate::error::{BootError, BootResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Signals that open the gate when no others are configured.
pub const DEFAULT_SIGNALS: [&str; 2] = ["after_setup_theme", "rest_api_init"];

/// Priority the bootloader subscribes at. Listeners run in ascending priority,
/// so this places it after listeners registered at the host's default of 10.
pub const DEFAULT_PRIORITY: i32 = 20;

/// Environment variable consulted for the base path override.
pub const BASE_PATH_ENV: &str = "SPROUT_BASEPATH";

/// Construction parameters for a [`Bootloader`](crate::boot::Bootloader).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    /// Lifecycle signals that open the gate. Any one of them is enough.
    pub signals: Vec<String>,

    /// Priority used when subscribing to each signal.
    pub priority: i32,

    /// Explicit base path. Takes precedence over the environment variable.
    pub base_path: Option<PathBuf>,

    /// Name of the environment variable holding a base path override.
    pub base_path_env: String,

    /// Directory this module is installed in; last resort for path lookups.
    pub install_root: PathBuf,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            signals: DEFAULT_SIGNALS.iter().map(|s| s.to_string()).collect(),
            priority: DEFAULT_PRIORITY,
            base_path: None,
            base_path_env: BASE_PATH_ENV.to_string(),
            install_root: PathBuf::from(env!("CARGO_MANIFEST_DIR")),
        }
    }
}

impl BootConfig {
    /// Replaces the signal set.
    pub fn with_signals<I, S>(mut self, signals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signals = signals.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    pub fn with_install_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.install_root = path.into();
        self
    }

    /// Checks that the signal set can ever open the gate.
    pub fn validate(&self) -> BootResult<()> {
        if self.signals.is_empty() {
            return Err(BootError::Config("no lifecycle signals configured".into()));
        }
        let mut seen = HashSet::new();
        for signal in &self.signals {
            if signal.trim().is_empty() {
                return Err(BootError::Config("blank lifecycle signal name".into()));
            }
            if !seen.insert(signal.as_str()) {
                return Err(BootError::Config(format!("duplicate lifecycle signal: {signal}")));
            }
        }
        Ok(())
    }
}

/// Read access to environment variables.
pub trait Environment: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment. Empty values count as unset.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

/// Fixed in-memory environment.
#[derive(Debug, Default, Clone)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl Environment for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).filter(|v| !v.is_empty()).cloned()
    }
}
