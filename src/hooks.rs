//! # Extension Points
//!
//! Named filters that let embedding code rewrite values the bootloader computes.
//! Each [`Hook`] holds an ordered list of transforms; [`Hook::apply`] threads a
//! value through all of them in registration order. An empty hook is the identity.
//!
//! The registry is explicit: it is created by the caller, handed to the
//! [`Bootloader`](crate::boot::Bootloader), and can still be extended afterwards
//! through [`Bootloader::hooks`](crate::boot::Bootloader::hooks).

use crate::boot::BootstrapPhase;
use crate::paths::Role;
use parking_lot::RwLock;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::trace;

type Transform<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

/// A single named extension point.
pub struct Hook<T> {
    name: String,
    transforms: RwLock<Vec<Transform<T>>>,
}

impl<T> Hook<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transforms: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a transform. Transforms run in the order they were added.
    pub fn add(&self, transform: impl Fn(T) -> T + Send + Sync + 'static) -> &Self {
        self.transforms.write().push(Arc::new(transform));
        self
    }

    pub fn len(&self) -> usize {
        self.transforms.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Threads `value` through every transform.
    pub fn apply(&self, value: T) -> T {
        // Snapshot so a transform may register further transforms without deadlocking.
        let transforms: Vec<Transform<T>> = self.transforms.read().clone();
        trace!(hook = %self.name, transforms = transforms.len(), "Applying hook");
        transforms.iter().fold(value, |acc, transform| transform(acc))
    }
}

impl<T> fmt::Debug for Hook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.name)
            .field("transforms", &self.len())
            .finish()
    }
}

/// The full set of extension points the bootloader consults.
#[derive(Debug)]
pub struct Hooks {
    /// `sprout/ready`: forces the gate open when no signal has fired.
    pub ready: Hook<bool>,
    /// `sprout/paths.base`: rewrites the resolved base path.
    pub base_path: Hook<PathBuf>,
    /// `sprout/bootstrap`: rewrites the bootstrap phase list.
    pub bootstrap: Hook<Vec<BootstrapPhase>>,
    app: Hook<Option<PathBuf>>,
    config: Hook<Option<PathBuf>>,
    storage: Hook<Option<PathBuf>>,
    resources: Hook<Option<PathBuf>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self {
            ready: Hook::new("sprout/ready"),
            base_path: Hook::new("sprout/paths.base"),
            bootstrap: Hook::new("sprout/bootstrap"),
            app: Hook::new(Role::App.hook_name()),
            config: Hook::new(Role::Config.hook_name()),
            storage: Hook::new(Role::Storage.hook_name()),
            resources: Hook::new(Role::Resources.hook_name()),
        }
    }

    /// `sprout/paths.{role}`: rewrites the resolved path for one role.
    pub fn role(&self, role: Role) -> &Hook<Option<PathBuf>> {
        match role {
            Role::App => &self.app,
            Role::Config => &self.config,
            Role::Storage => &self.storage,
            Role::Resources => &self.resources,
        }
    }
}

impl Default for Hooks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_hook_is_identity() {
        let hook: Hook<u32> = Hook::new("test/empty");
        assert!(hook.is_empty());
        assert_eq!(hook.apply(7), 7);
    }

    #[test]
    fn transforms_apply_in_registration_order() {
        let hook: Hook<String> = Hook::new("test/order");
        hook.add(|s| s + "a").add(|s| s + "b");
        hook.add(|s| s + "c");
        assert_eq!(hook.apply(String::new()), "abc");
    }

    #[test]
    fn transform_can_register_another_transform() {
        let hook: Arc<Hook<u32>> = Arc::new(Hook::new("test/reentrant"));
        let inner = hook.clone();
        hook.add(move |v| {
            inner.add(|v| v * 10);
            v + 1
        });
        assert_eq!(hook.apply(1), 2);
        assert_eq!(hook.apply(1), 20);
    }

    #[test]
    fn role_hooks_are_named_after_their_role() {
        let hooks = Hooks::new();
        assert_eq!(hooks.role(Role::Storage).name(), "sprout/paths.storage");
        assert_eq!(hooks.bootstrap.name(), "sprout/bootstrap");
    }
}
