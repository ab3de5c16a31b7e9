//! # The Bootloader
//!
//! The orchestrator that turns host lifecycle signals into a booted application.
//!
//! ## Lifecycle
//!
//! ```text
//! Waiting --(gate opens)--> Bootstrapping --(pipeline ok)--> Ready
//!                                 |
//!                                 +--(construction or phase fails)--> Failed
//! ```
//!
//! - **Waiting**: `register` and `call` are buffered in submission order. If the
//!   gate turns out to be open when one of them arrives, the bootloader boots on
//!   the spot and the call runs right after the buffer.
//! - **Bootstrapping**: the application is built and the pipeline runs. Work
//!   submitted in the meantime (for example by a provider) joins the buffer.
//! - **Ready**: the buffer has been drained; `register` and `call` run immediately.
//! - **Failed**: bootstrap failed once. Nothing is retried, and new work is
//!   refused with [`BootError::Aborted`].
//!
//! ## Wiring
//!
//! [`BootloaderBuilder::build`] subscribes the bootloader to every configured
//! signal on the host. Each time one fires, [`Bootloader::invoke`] checks the
//! gate, boots on the first success, and drains the buffer.

pub mod gate;
pub mod pipeline;
pub mod queue;

pub use gate::ReadinessGate;
pub use pipeline::{BootstrapPhase, BootstrapPipeline, DEFAULT_PHASES};
pub use queue::{Callback, Deferred, DeferredQueue};

use crate::application::{Application, ProviderId};
use crate::config::{BootConfig, Environment, ProcessEnv};
use crate::error::{AppError, BootError, BootResult};
use crate::hooks::Hooks;
use crate::host::LifecycleHost;
use crate::paths::{PathResolver, RolePaths, StaticLayout, ThemeLayout};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use tracing::{debug, error, info, instrument, trace};

/// Builds the application from the resolved paths.
pub type Factory<A> = Box<dyn Fn(PathBuf, RolePaths) -> Result<A, AppError> + Send + Sync>;

/// Where the bootloader is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootStage {
    Waiting,
    Bootstrapping,
    Ready,
    Failed,
}

enum Stage<A> {
    Waiting,
    Bootstrapping,
    /// Built and bootstrapped; the buffer is being drained.
    Draining(Arc<A>),
    Ready(Arc<A>),
    Failed,
}

struct State<A> {
    stage: Stage<A>,
    queue: DeferredQueue<A>,
}

/// The startup orchestrator.
///
/// Shared as `Arc<Bootloader<A>>`: the host holds a weak reference through its
/// listeners, callers hold strong ones to submit work.
pub struct Bootloader<A: Application> {
    gate: ReadinessGate,
    paths: PathResolver,
    pipeline: BootstrapPipeline,
    host: Arc<dyn LifecycleHost>,
    hooks: Arc<Hooks>,
    factory: Factory<A>,
    state: Mutex<State<A>>,
}

impl<A: Application> std::fmt::Debug for Bootloader<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bootloader").finish_non_exhaustive()
    }
}

impl<A: Application> Bootloader<A> {
    pub fn builder(config: BootConfig, host: Arc<dyn LifecycleHost>) -> BootloaderBuilder<A> {
        BootloaderBuilder::new(config, host)
    }

    /// Registers a service provider with the application, now or once booted.
    pub fn register(&self, provider: impl Into<ProviderId>, force: bool) -> BootResult<&Self> {
        self.defer(Deferred::register(provider.into(), force))
    }

    /// Runs `callback` with the application, now or once booted.
    pub fn call<F, E>(&self, callback: F) -> BootResult<&Self>
    where
        F: FnOnce(&A) -> Result<(), E> + Send + 'static,
        E: Into<AppError>,
    {
        self.defer(Deferred::call(callback))
    }

    fn defer(&self, item: Deferred<A>) -> BootResult<&Self> {
        // The gate may already be open without a subscribed signal having
        // reached us (fired before `build`, or opened by the ready hook).
        if self.stage() == BootStage::Waiting && self.is_ready() {
            self.invoke()?;
        }

        let app = {
            let mut state = self.state.lock();
            let ready = match &state.stage {
                Stage::Ready(app) => Some(app.clone()),
                Stage::Failed => return Err(BootError::Aborted),
                _ => None,
            };
            match ready {
                Some(app) => app,
                None => {
                    state.queue.push(item);
                    debug!(queued = state.queue.len(), "Deferred until boot");
                    return Ok(self);
                }
            }
        };
        trace!(?item, "Dispatching immediately");
        item.run(&app)?;
        Ok(self)
    }

    /// The host-facing entry point, run on every subscribed signal.
    ///
    /// A no-op until the gate opens. The first call after that builds and
    /// bootstraps the application and drains the buffer; errors from either are
    /// returned to the host.
    #[instrument(name = "boot", skip(self))]
    pub fn invoke(&self) -> BootResult<()> {
        if !self.is_ready() {
            trace!("Gate closed");
            return Ok(());
        }
        match self.boot()? {
            Some(app) => self.flush(&app),
            None => Ok(()),
        }
    }

    /// Checks the gate. Latches open on the first success.
    pub fn is_ready(&self) -> bool {
        self.gate.check(self.host.as_ref(), &self.hooks.ready)
    }

    /// Moves Waiting to Bootstrapping and builds the application. Returns `None`
    /// when another invocation is already booting or draining.
    fn boot(&self) -> BootResult<Option<Arc<A>>> {
        {
            let mut state = self.state.lock();
            match &state.stage {
                Stage::Ready(app) => return Ok(Some(app.clone())),
                Stage::Bootstrapping | Stage::Draining(_) => {
                    debug!("Boot already in progress");
                    return Ok(None);
                }
                Stage::Failed => return Err(BootError::Aborted),
                Stage::Waiting => {}
            }
            state.stage = Stage::Bootstrapping;
        }

        match self.construct() {
            Ok(app) => {
                self.state.lock().stage = Stage::Draining(app.clone());
                Ok(Some(app))
            }
            Err(e) => {
                error!(error = %e, "Bootstrap failed");
                self.state.lock().stage = Stage::Failed;
                Err(e)
            }
        }
    }

    fn construct(&self) -> BootResult<Arc<A>> {
        let base = self.paths.base().to_path_buf();
        let roles = self.paths.roles().clone();
        info!(base = ?base, roles = roles.len(), "Constructing application");

        let app = Arc::new((self.factory)(base, roles).map_err(BootError::Construct)?);
        self.pipeline.run(app.as_ref())?;
        Ok(app)
    }

    /// Drains the buffer into `app`, oldest first, then opens immediate dispatch.
    fn flush(&self, app: &Arc<A>) -> BootResult<()> {
        let mut drained = 0usize;
        loop {
            // The lock is released before running, so entries may submit more work.
            let next = {
                let mut state = self.state.lock();
                match state.queue.pop() {
                    Some(item) => item,
                    None => {
                        if matches!(state.stage, Stage::Draining(_)) {
                            state.stage = Stage::Ready(app.clone());
                            info!(drained, "Application ready");
                        }
                        return Ok(());
                    }
                }
            };

            if let Err(e) = next.run(app) {
                let mut state = self.state.lock();
                let err = state.queue.abandon(e);
                state.stage = Stage::Ready(app.clone());
                return Err(err);
            }
            drained += 1;
        }
    }

    pub fn stage(&self) -> BootStage {
        match self.state.lock().stage {
            Stage::Waiting => BootStage::Waiting,
            Stage::Bootstrapping | Stage::Draining(_) => BootStage::Bootstrapping,
            Stage::Ready(_) => BootStage::Ready,
            Stage::Failed => BootStage::Failed,
        }
    }

    /// The application, once the bootloader is Ready.
    pub fn application(&self) -> Option<Arc<A>> {
        match &self.state.lock().stage {
            Stage::Ready(app) => Some(app.clone()),
            _ => None,
        }
    }

    /// Number of buffered calls.
    pub fn queued(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn signals(&self) -> &[String] {
        self.gate.signals()
    }

    pub fn base_path(&self) -> &Path {
        self.paths.base()
    }

    pub fn role_paths(&self) -> &RolePaths {
        self.paths.roles()
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }
}

/// Collects the collaborators a [`Bootloader`] needs.
pub struct BootloaderBuilder<A: Application> {
    config: BootConfig,
    host: Arc<dyn LifecycleHost>,
    env: Arc<dyn Environment>,
    layout: Option<Arc<dyn ThemeLayout>>,
    hooks: Arc<Hooks>,
    factory: Factory<A>,
}

impl<A: Application> BootloaderBuilder<A> {
    pub fn new(config: BootConfig, host: Arc<dyn LifecycleHost>) -> Self {
        Self {
            config,
            host,
            env: Arc::new(ProcessEnv),
            layout: None,
            hooks: Arc::new(Hooks::new()),
            factory: Box::new(|base, paths| A::new(base, paths).map_err(BootError::application)),
        }
    }

    pub fn env(mut self, env: Arc<dyn Environment>) -> Self {
        self.env = env;
        self
    }

    /// Defaults to a single-theme layout rooted at the install root.
    pub fn layout(mut self, layout: Arc<dyn ThemeLayout>) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn hooks(mut self, hooks: Arc<Hooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Replaces `A::new` as the way the application is built.
    pub fn factory<F, E>(mut self, factory: F) -> Self
    where
        F: Fn(PathBuf, RolePaths) -> Result<A, E> + Send + Sync + 'static,
        E: Into<AppError>,
    {
        self.factory = Box::new(move |base, paths| factory(base, paths).map_err(Into::<AppError>::into));
        self
    }

    /// Validates the configuration and subscribes to every signal.
    pub fn build(self) -> BootResult<Arc<Bootloader<A>>> {
        self.config.validate()?;

        let layout = self
            .layout
            .unwrap_or_else(|| Arc::new(StaticLayout::single(&self.config.install_root)) as Arc<dyn ThemeLayout>);
        let paths = PathResolver::new(&self.config, self.env, layout, self.hooks.clone());

        let boot = Arc::new(Bootloader {
            gate: ReadinessGate::new(self.config.signals.clone()),
            paths,
            pipeline: BootstrapPipeline::new(self.hooks.clone()),
            host: self.host.clone(),
            hooks: self.hooks,
            factory: self.factory,
            state: Mutex::new(State {
                stage: Stage::Waiting,
                queue: DeferredQueue::new(),
            }),
        });

        for signal in &self.config.signals {
            let weak: Weak<Bootloader<A>> = Arc::downgrade(&boot);
            self.host.subscribe(
                signal,
                self.config.priority,
                Arc::new(move || match weak.upgrade() {
                    Some(boot) => boot.invoke(),
                    None => Ok(()),
                }),
            );
        }
        info!(signals = ?self.config.signals, priority = self.config.priority, "Bootloader subscribed");

        Ok(boot)
    }
}
