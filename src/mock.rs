//! # Recording Application
//!
//! An [`Application`] for tests and demos that does nothing but remember.
//!
//! Every constructor argument, bootstrap phase, provider registration and note
//! lands in a shared [`Journal`], so a test can assert exactly what the
//! bootloader did and in which order. Failures can be injected per phase or per
//! provider.
//!
//! # Example
//! ```
//! use sprout::application::Application;
//! use sprout::mock::{Event, RecordingApplication};
//! use sprout::paths::RolePaths;
//!
//! let app = RecordingApplication::new("/srv/app".into(), RolePaths::default()).unwrap();
//! app.note("hello");
//! assert_eq!(app.journal().events().last(), Some(&Event::Note("hello".into())));
//! ```

use crate::application::{Application, ProviderId};
use crate::boot::BootstrapPhase;
use crate::paths::RolePaths;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Something the application was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Constructed { base: PathBuf, paths: RolePaths },
    Phase(BootstrapPhase),
    Registered { provider: ProviderId, force: bool },
    Note(String),
}

/// Shared, append-only event log.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.events.lock().push(event);
    }

    /// A snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }
}

/// Errors the recording application can be told to produce.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MockError {
    #[error("Phase failed: {0}")]
    Phase(BootstrapPhase),
    #[error("Provider rejected: {0}")]
    Provider(ProviderId),
}

/// An application that records what it is asked to do.
#[derive(Debug)]
pub struct RecordingApplication {
    base: PathBuf,
    paths: RolePaths,
    journal: Journal,
    providers: Mutex<Vec<ProviderId>>,
    fail_phase: Option<BootstrapPhase>,
    fail_provider: Option<ProviderId>,
}

impl RecordingApplication {
    /// Builds an application that writes into an existing journal.
    pub fn with_journal(journal: Journal, base: PathBuf, paths: RolePaths) -> Self {
        journal.push(Event::Constructed {
            base: base.clone(),
            paths: paths.clone(),
        });
        Self {
            base,
            paths,
            journal,
            providers: Mutex::new(Vec::new()),
            fail_phase: None,
            fail_provider: None,
        }
    }

    /// Makes `bootstrap_with` fail when it reaches `phase`.
    pub fn failing_phase(mut self, phase: BootstrapPhase) -> Self {
        self.fail_phase = Some(phase);
        self
    }

    /// Makes `register` reject `provider`.
    pub fn failing_provider(mut self, provider: impl Into<ProviderId>) -> Self {
        self.fail_provider = Some(provider.into());
        self
    }

    pub fn note(&self, note: impl Into<String>) {
        self.journal.push(Event::Note(note.into()));
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn base_path(&self) -> &Path {
        &self.base
    }

    pub fn paths(&self) -> &RolePaths {
        &self.paths
    }

    /// Registered providers, in registration order, without duplicates.
    pub fn providers(&self) -> Vec<ProviderId> {
        self.providers.lock().clone()
    }

    pub fn has_run(&self, phase: &BootstrapPhase) -> bool {
        self.journal
            .events()
            .iter()
            .any(|e| matches!(e, Event::Phase(p) if p == phase))
    }
}

impl Application for RecordingApplication {
    type Error = MockError;

    fn new(base_path: PathBuf, paths: RolePaths) -> Result<Self, Self::Error> {
        Ok(Self::with_journal(Journal::new(), base_path, paths))
    }

    fn bootstrap_with(&self, phases: &[BootstrapPhase]) -> Result<(), Self::Error> {
        for phase in phases {
            if self.fail_phase.as_ref() == Some(phase) {
                return Err(MockError::Phase(phase.clone()));
            }
            self.journal.push(Event::Phase(phase.clone()));
        }
        Ok(())
    }

    fn register(&self, provider: &ProviderId, force: bool) -> Result<(), Self::Error> {
        if self.fail_provider.as_ref() == Some(provider) {
            return Err(MockError::Provider(provider.clone()));
        }
        self.journal.push(Event::Registered {
            provider: provider.clone(),
            force,
        });
        let mut providers = self.providers.lock();
        if !providers.contains(provider) {
            providers.push(provider.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_is_idempotent_but_journaled() {
        let app = RecordingApplication::new("/base".into(), RolePaths::default()).unwrap();
        app.register(&"cache".into(), false).unwrap();
        app.register(&"cache".into(), true).unwrap();
        assert_eq!(app.providers(), vec![ProviderId::new("cache")]);
        assert_eq!(app.journal().events().len(), 3);
    }

    #[test]
    fn failing_phase_stops_bootstrap() {
        let app = RecordingApplication::new("/base".into(), RolePaths::default())
            .unwrap()
            .failing_phase(BootstrapPhase::RegisterFacades);
        let err = app
            .bootstrap_with(&[BootstrapPhase::LoadConfiguration, BootstrapPhase::RegisterFacades])
            .unwrap_err();
        assert_eq!(err, MockError::Phase(BootstrapPhase::RegisterFacades));
        assert!(app.has_run(&BootstrapPhase::LoadConfiguration));
        assert!(!app.has_run(&BootstrapPhase::RegisterFacades));
    }
}
