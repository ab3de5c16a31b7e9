//! Bootstrap phases and the pipeline that runs them.

use crate::application::Application;
use crate::error::{BootError, BootResult};
use crate::hooks::Hooks;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// One step of application bootstrap.
///
/// The bootloader only sequences phases; what each one does is up to the
/// application's `bootstrap_with`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapPhase {
    /// Capture the state of the inbound request.
    CaptureRequest,
    /// Detect host features the application adapts to.
    DetectFeatures,
    LoadConfiguration,
    /// Install error and exception handling.
    HandleExceptions,
    RegisterProviders,
    RegisterFacades,
    BootProviders,
    /// Register console commands.
    RegisterConsole,
    /// A phase added through the `sprout/bootstrap` hook.
    Custom(String),
}

/// The built-in phase order.
pub const DEFAULT_PHASES: [BootstrapPhase; 8] = [
    BootstrapPhase::CaptureRequest,
    BootstrapPhase::DetectFeatures,
    BootstrapPhase::LoadConfiguration,
    BootstrapPhase::HandleExceptions,
    BootstrapPhase::RegisterProviders,
    BootstrapPhase::RegisterFacades,
    BootstrapPhase::BootProviders,
    BootstrapPhase::RegisterConsole,
];

impl fmt::Display for BootstrapPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BootstrapPhase::CaptureRequest => "capture_request",
            BootstrapPhase::DetectFeatures => "detect_features",
            BootstrapPhase::LoadConfiguration => "load_configuration",
            BootstrapPhase::HandleExceptions => "handle_exceptions",
            BootstrapPhase::RegisterProviders => "register_providers",
            BootstrapPhase::RegisterFacades => "register_facades",
            BootstrapPhase::BootProviders => "boot_providers",
            BootstrapPhase::RegisterConsole => "register_console",
            BootstrapPhase::Custom(name) => name.as_str(),
        };
        f.write_str(name)
    }
}

/// Produces the phase list and hands it to the application.
pub struct BootstrapPipeline {
    hooks: Arc<Hooks>,
}

impl BootstrapPipeline {
    pub fn new(hooks: Arc<Hooks>) -> Self {
        Self { hooks }
    }

    /// The built-in phases after the `sprout/bootstrap` hook has had its say.
    pub fn phases(&self) -> Vec<BootstrapPhase> {
        self.hooks.bootstrap.apply(DEFAULT_PHASES.to_vec())
    }

    /// Runs the phases against `app`. Failures propagate untouched.
    #[instrument(name = "pipeline", skip_all)]
    pub fn run<A: Application>(&self, app: &A) -> BootResult<Vec<BootstrapPhase>> {
        let phases = self.phases();
        debug!(phases = ?phases.iter().map(ToString::to_string).collect::<Vec<_>>(), "Bootstrap phases");

        app.bootstrap_with(&phases)
            .map_err(|e| BootError::Bootstrap {
                phases: phases.clone(),
                source: BootError::application(e),
            })?;

        info!(count = phases.len(), "Bootstrap complete");
        Ok(phases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Event, RecordingApplication};
    use crate::paths::RolePaths;

    fn app() -> RecordingApplication {
        RecordingApplication::new("/base".into(), RolePaths::default()).unwrap()
    }

    #[test]
    fn default_phases_without_hooks() {
        let pipeline = BootstrapPipeline::new(Arc::new(Hooks::new()));
        assert_eq!(pipeline.phases(), DEFAULT_PHASES.to_vec());
    }

    #[test]
    fn hook_can_remove_and_append() {
        let hooks = Arc::new(Hooks::new());
        hooks.bootstrap.add(|mut phases| {
            phases.retain(|p| *p != BootstrapPhase::RegisterConsole);
            phases.push(BootstrapPhase::Custom("warm_cache".into()));
            phases
        });
        let pipeline = BootstrapPipeline::new(hooks);
        let phases = pipeline.phases();
        assert_eq!(phases.len(), 8);
        assert_eq!(phases.last().map(ToString::to_string).as_deref(), Some("warm_cache"));
        assert!(!phases.contains(&BootstrapPhase::RegisterConsole));
    }

    #[test]
    fn run_hands_phases_to_application_in_order() {
        let app = app();
        let pipeline = BootstrapPipeline::new(Arc::new(Hooks::new()));
        pipeline.run(&app).unwrap();
        let ran: Vec<_> = app
            .journal()
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Phase(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(ran, DEFAULT_PHASES.to_vec());
    }

    #[test]
    fn phase_failure_propagates() {
        let app = app().failing_phase(BootstrapPhase::LoadConfiguration);
        let pipeline = BootstrapPipeline::new(Arc::new(Hooks::new()));
        let err = pipeline.run(&app).unwrap_err();
        assert!(matches!(err, BootError::Bootstrap { .. }));
        assert!(!app.has_run(&BootstrapPhase::HandleExceptions));
    }
}
