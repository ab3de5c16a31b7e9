//! # Path Resolution
//!
//! Finds the directories the application is constructed with: one base path and
//! four role paths (`app`, `config`, `storage`, `resources`).
//!
//! ## Base Path
//!
//! 1. The theme's `config` directory, if the host can locate one; its parent is the base.
//!    Otherwise the module's install root.
//! 2. An explicit override (config value, then environment variable) replaces step 1.
//! 3. The `sprout/paths.base` hook may replace the result.
//!
//! ## Role Paths
//!
//! Each role is searched in five roots, in order: the base path, the host's
//! template lookup, the stylesheet directory, the template directory and the
//! install root. Only existing directories survive, duplicates are dropped, and
//! the first one wins. The `sprout/paths.{role}` hook then has the final word,
//! and may point anywhere, including at a directory that does not exist.
//!
//! Both results are resolved once and memoized for the life of the resolver.

pub mod layout;

pub use layout::{StaticLayout, ThemeLayout};

use crate::config::{BootConfig, Environment};
use crate::hooks::Hooks;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// A logical directory the application needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    App,
    Config,
    Storage,
    Resources,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::App, Role::Config, Role::Storage, Role::Resources];

    /// Directory name searched for this role.
    pub fn dir_name(self) -> &'static str {
        match self {
            Role::App => "app",
            Role::Config => "config",
            Role::Storage => "storage",
            Role::Resources => "resources",
        }
    }

    pub fn hook_name(self) -> String {
        format!("sprout/paths.{}", self.dir_name())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Resolved role paths. A role with no match is simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePaths {
    paths: BTreeMap<Role, PathBuf>,
}

impl RolePaths {
    pub fn get(&self, role: Role) -> Option<&Path> {
        self.paths.get(&role).map(PathBuf::as_path)
    }

    pub fn insert(&mut self, role: Role, path: PathBuf) {
        self.paths.insert(role, path);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &Path)> {
        self.paths.iter().map(|(role, path)| (*role, path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Resolves and memoizes the base path and role paths.
pub struct PathResolver {
    explicit_base: Option<PathBuf>,
    base_env: String,
    install_root: PathBuf,
    env: Arc<dyn Environment>,
    layout: Arc<dyn ThemeLayout>,
    hooks: Arc<Hooks>,
    base: OnceLock<PathBuf>,
    roles: OnceLock<RolePaths>,
}

impl PathResolver {
    pub fn new(
        config: &BootConfig,
        env: Arc<dyn Environment>,
        layout: Arc<dyn ThemeLayout>,
        hooks: Arc<Hooks>,
    ) -> Self {
        Self {
            explicit_base: config.base_path.clone(),
            base_env: config.base_path_env.clone(),
            install_root: config.install_root.clone(),
            env,
            layout,
            hooks,
            base: OnceLock::new(),
            roles: OnceLock::new(),
        }
    }

    /// The base path, resolved on first use.
    pub fn base(&self) -> &Path {
        self.base.get_or_init(|| self.resolve_base())
    }

    /// All role paths, resolved on first use.
    pub fn roles(&self) -> &RolePaths {
        self.roles.get_or_init(|| {
            let mut paths = RolePaths::default();
            for role in Role::ALL {
                if let Some(path) = self.resolve_role(role) {
                    paths.insert(role, path);
                }
            }
            info!(base = ?self.base(), resolved = paths.len(), "Role paths resolved");
            paths
        })
    }

    fn resolve_base(&self) -> PathBuf {
        let discovered = self
            .layout
            .locate(Role::Config.dir_name())
            .and_then(|config| config.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| self.install_root.clone());

        let chosen = match self.base_override() {
            Some(path) => {
                debug!(path = ?path, "Base path override");
                path
            }
            None => discovered,
        };

        let base = self.hooks.base_path.apply(chosen);
        info!(path = ?base, "Base path resolved");
        base
    }

    fn base_override(&self) -> Option<PathBuf> {
        self.explicit_base
            .clone()
            .or_else(|| self.env.var(&self.base_env).map(PathBuf::from))
    }

    /// Candidate directories for `role`, in priority order, before filtering.
    pub fn candidates(&self, role: Role) -> Vec<PathBuf> {
        let name = role.dir_name();
        let mut candidates = vec![self.base().join(name)];
        candidates.extend(self.layout.locate(name));
        candidates.push(self.layout.stylesheet_directory().join(name));
        candidates.push(self.layout.template_directory().join(name));
        candidates.push(self.install_root.join(name));
        candidates
    }

    /// Candidates that exist as directories, each physical directory once.
    pub fn search_roots(&self, role: Role) -> Vec<PathBuf> {
        existing_directories(self.candidates(role))
    }

    /// Resolves one role without touching the memoized role map.
    pub fn resolve_role(&self, role: Role) -> Option<PathBuf> {
        let found = self.search_roots(role).into_iter().next();
        let path = self.hooks.role(role).apply(found.clone());
        if path != found {
            debug!(%role, found = ?found, path = ?path, "Role path overridden");
        } else {
            debug!(%role, path = ?path, "Role path");
        }
        path
    }
}

/// Existing directories in candidate order, dropping entries that resolve to one
/// already kept.
fn existing_directories(candidates: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|path| path.is_dir())
        .filter(|path| seen.insert(fs::canonicalize(path).unwrap_or_else(|_| path.clone())))
        .collect()
}
