use sprout::boot::{BootStage, Bootloader, BootstrapPhase, DEFAULT_PHASES};
use sprout::config::{BootConfig, MapEnv};
use sprout::error::{AppError, BootError};
use sprout::hooks::Hooks;
use sprout::host::EventHost;
use sprout::mock::{Event, Journal, RecordingApplication};
use sprout::paths::{Role, StaticLayout};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A theme directory, a separate install root, and a shared journal.
struct Harness {
    host: Arc<EventHost>,
    journal: Journal,
    theme: tempfile::TempDir,
    install: tempfile::TempDir,
}

impl Harness {
    fn new() -> Self {
        Self {
            host: Arc::new(EventHost::new()),
            journal: Journal::new(),
            theme: tempfile::tempdir().unwrap(),
            install: tempfile::tempdir().unwrap(),
        }
    }

    fn bootloader(&self, env: MapEnv, hooks: Arc<Hooks>) -> Arc<Bootloader<RecordingApplication>> {
        let journal = self.journal.clone();
        let config = BootConfig::default().with_install_root(self.install.path());
        Bootloader::builder(config, self.host.clone())
            .env(Arc::new(env))
            .layout(Arc::new(StaticLayout::single(self.theme.path())))
            .hooks(hooks)
            .factory(move |base, paths| {
                Ok::<_, AppError>(RecordingApplication::with_journal(journal.clone(), base, paths))
            })
            .build()
            .unwrap()
    }

    fn notes(&self) -> Vec<String> {
        self.journal
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Note(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    fn phases(&self) -> Vec<BootstrapPhase> {
        self.journal
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Phase(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    fn constructions(&self) -> usize {
        self.journal
            .events()
            .iter()
            .filter(|e| matches!(e, Event::Constructed { .. }))
            .count()
    }
}

fn note(tag: &'static str) -> impl FnOnce(&RecordingApplication) -> Result<(), AppError> + Send {
    move |app: &RecordingApplication| {
        app.note(tag);
        Ok(())
    }
}

/// Scenario A: two calls queued before the gate opens run in order, once.
#[test]
fn queued_calls_run_in_submission_order_once() {
    let h = Harness::new();
    let boot = h.bootloader(MapEnv::new(), Arc::new(Hooks::new()));

    boot.call(note("f1")).unwrap().call(note("f2")).unwrap();
    assert!(h.notes().is_empty());
    assert_eq!(boot.queued(), 2);

    h.host.fire("after_setup_theme").unwrap();
    assert_eq!(h.notes(), vec!["f1", "f2"]);
    assert_eq!(boot.queued(), 0);

    h.host.fire("after_setup_theme").unwrap();
    h.host.fire("rest_api_init").unwrap();
    assert_eq!(h.notes(), vec!["f1", "f2"]);
    assert_eq!(h.constructions(), 1);
}

/// Scenario B: an environment override fixes the base path.
#[test]
fn env_override_fixes_base_path() {
    let h = Harness::new();
    fs::create_dir(h.theme.path().join("config")).unwrap();
    let env = MapEnv::new().with("SPROUT_BASEPATH", "/srv/app");
    let boot = h.bootloader(env, Arc::new(Hooks::new()));

    assert_eq!(boot.base_path(), Path::new("/srv/app"));

    h.host.fire("rest_api_init").unwrap();
    let app = boot.application().unwrap();
    assert_eq!(app.base_path(), Path::new("/srv/app"));
    // /srv/app/config does not exist here, so the theme's config wins.
    assert_eq!(app.paths().get(Role::Config), Some(h.theme.path().join("config").as_path()));
}

/// Scenario C: nothing fired and no override means nothing is built.
#[test]
fn closed_gate_builds_nothing() {
    let h = Harness::new();
    let boot = h.bootloader(MapEnv::new(), Arc::new(Hooks::new()));
    boot.register("cache", false).unwrap();

    h.host.fire("init").unwrap();
    h.host.fire("wp_loaded").unwrap();
    boot.invoke().unwrap();

    assert!(!boot.is_ready());
    assert_eq!(boot.stage(), BootStage::Waiting);
    assert_eq!(h.constructions(), 0);
    assert_eq!(boot.queued(), 1);
}

/// Scenario D, runtime half: an unusable signal set produces no bootloader.
/// (A type without the `Application` capability set does not compile; see the
/// `application` module docs.)
#[test]
fn unusable_signal_set_is_a_construction_error() {
    let host = Arc::new(EventHost::new());
    let config = BootConfig::default().with_signals(["after_setup_theme", ""]);
    let result = Bootloader::<RecordingApplication>::builder(config, host.clone()).build();
    assert!(matches!(result, Err(BootError::Config(_))));
    assert_eq!(host.listener_count("after_setup_theme"), 0);
}

/// Scenario E: dropping one phase leaves the rest in their original order.
#[test]
fn filtered_phase_is_skipped() {
    let h = Harness::new();
    let hooks = Arc::new(Hooks::new());
    hooks.bootstrap.add(|mut phases| {
        phases.retain(|p| *p != BootstrapPhase::RegisterFacades);
        phases
    });
    let boot = h.bootloader(MapEnv::new(), hooks);

    h.host.fire("after_setup_theme").unwrap();
    assert_eq!(boot.stage(), BootStage::Ready);

    let expected: Vec<BootstrapPhase> = DEFAULT_PHASES
        .iter()
        .filter(|p| **p != BootstrapPhase::RegisterFacades)
        .cloned()
        .collect();
    assert_eq!(h.phases(), expected);
}

#[test]
fn ready_hook_opens_gate_without_signal() {
    let h = Harness::new();
    let hooks = Arc::new(Hooks::new());
    let boot = h.bootloader(MapEnv::new(), hooks.clone());
    boot.call(note("early")).unwrap();
    assert_eq!(boot.queued(), 1);

    hooks.ready.add(|_| true);
    // The bootloader is not subscribed to `init`, so the host invokes nothing.
    h.host.fire("init").unwrap();
    assert_eq!(boot.stage(), BootStage::Waiting);

    boot.invoke().unwrap();
    assert_eq!(boot.stage(), BootStage::Ready);
    assert_eq!(h.notes(), vec!["early"]);
}

#[test]
fn open_gate_runs_calls_without_any_signal() {
    let h = Harness::new();
    let hooks = Arc::new(Hooks::new());
    hooks.ready.add(|_| true);
    let boot = h.bootloader(MapEnv::new(), hooks);

    boot.call(note("first")).unwrap();
    assert_eq!(boot.stage(), BootStage::Ready);
    assert_eq!(h.notes(), vec!["first"]);
    assert_eq!(h.constructions(), 1);
}

#[test]
fn gate_stays_open_after_override_flips() {
    let h = Harness::new();
    let hooks = Arc::new(Hooks::new());
    let asked = Arc::new(AtomicUsize::new(0));
    let counter = asked.clone();
    hooks.ready.add(move |_| counter.fetch_add(1, Ordering::SeqCst) == 0);
    let boot = h.bootloader(MapEnv::new(), hooks);

    assert!(boot.is_ready());
    assert!(boot.is_ready());
    assert_eq!(asked.load(Ordering::SeqCst), 1);
}

#[test]
fn role_paths_come_from_the_search_roots() {
    let h = Harness::new();
    fs::create_dir(h.theme.path().join("config")).unwrap();
    fs::create_dir(h.theme.path().join("app")).unwrap();
    fs::create_dir(h.install.path().join("resources")).unwrap();
    fs::write(h.install.path().join("storage"), b"file").unwrap();

    let hooks = Arc::new(Hooks::new());
    hooks
        .role(Role::Storage)
        .add(|found| found.or_else(|| Some(PathBuf::from("/var/cache/sprout"))));
    let boot = h.bootloader(MapEnv::new(), hooks);
    h.host.fire("after_setup_theme").unwrap();

    let app = boot.application().unwrap();
    // The theme has a config dir, so the theme is the base.
    assert_eq!(app.base_path(), h.theme.path());
    assert_eq!(app.paths().get(Role::App), Some(h.theme.path().join("app").as_path()));
    assert_eq!(
        app.paths().get(Role::Resources),
        Some(h.install.path().join("resources").as_path())
    );
    assert_eq!(app.paths().get(Role::Storage), Some(Path::new("/var/cache/sprout")));
    assert_eq!(boot.role_paths(), app.paths());
}

#[test]
fn registrations_and_calls_interleave_in_order() {
    let h = Harness::new();
    let boot = h.bootloader(MapEnv::new(), Arc::new(Hooks::new()));
    boot.register("events", false)
        .unwrap()
        .call(note("after events"))
        .unwrap()
        .register("events", true)
        .unwrap();

    h.host.fire("after_setup_theme").unwrap();

    let tail: Vec<Event> = h
        .journal
        .events()
        .into_iter()
        .filter(|e| !matches!(e, Event::Constructed { .. } | Event::Phase(_)))
        .collect();
    assert_eq!(
        tail,
        vec![
            Event::Registered { provider: "events".into(), force: false },
            Event::Note("after events".into()),
            Event::Registered { provider: "events".into(), force: true },
        ]
    );
}

#[test]
fn signal_fired_before_construction_still_counts() {
    let host = Arc::new(EventHost::new());
    host.fire("after_setup_theme").unwrap();

    let config = BootConfig::default().with_base_path("/srv/app");
    let boot = Bootloader::<RecordingApplication>::builder(config, host.clone())
        .env(Arc::new(MapEnv::new()))
        .build()
        .unwrap();
    assert!(boot.is_ready());

    // The signal will not fire again; the call itself boots the application.
    boot.call(note("late subscriber")).unwrap();
    assert_eq!(boot.stage(), BootStage::Ready);
    assert_eq!(boot.queued(), 0);

    let app = boot.application().unwrap();
    assert_eq!(app.journal().events().last(), Some(&Event::Note("late subscriber".into())));
}
