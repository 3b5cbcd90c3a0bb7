//! The per-class orchestrator

use crate::error::{InitializationError, InitializationResult};
use crate::guard::{self, Fault};
use crate::notifier::RunNotifier;
use crate::report::{ClassReport, Failure, FailureKind, MethodOutcome};
use crate::strategy::{DefaultRunnerStrategy, RunnerStrategy};
use shadowbox_environment::{HostStatics, SdkEnvironment, ShadowTableCache};
use shadowbox_lifecycle::{TestClass, TestLifecycle};
use shadowbox_types::{HarnessConfig, TestMethod};
use std::sync::Arc;
use std::time::Instant;

/// Upper bound on teardown retries; each panicking pass releases at least
/// one part of the environment.
const MAX_CLEAR_ATTEMPTS: usize = 8;

/// Runs every test method of one class inside a fresh environment.
///
/// ```rust
/// use shadowbox_lifecycle::FnTestClass;
/// use shadowbox_runner::{RunNotifier, SandboxRunner};
///
/// let class = FnTestClass::new("com.example.SmokeTest").test("starts", |_env| Ok(()));
/// let mut runner = SandboxRunner::new(class);
/// let report = runner.run(&RunNotifier::new());
///
/// assert!(report.is_success());
/// assert!(runner.all_state_is_cleared());
/// ```
pub struct SandboxRunner {
    class: Arc<dyn TestClass>,
    strategy: Arc<dyn RunnerStrategy>,
    settings: HarnessConfig,
    host: HostStatics,
    cache: ShadowTableCache,
    environment: Option<SdkEnvironment>,
    lifecycle: Option<Box<dyn TestLifecycle>>,
}

impl SandboxRunner {
    pub fn new(class: impl TestClass + 'static) -> Self {
        Self::from_shared(Arc::new(class))
    }

    pub fn from_shared(class: Arc<dyn TestClass>) -> Self {
        Self {
            class,
            strategy: Arc::new(DefaultRunnerStrategy),
            settings: HarnessConfig::default(),
            host: HostStatics::new(),
            cache: ShadowTableCache::new(),
            environment: None,
            lifecycle: None,
        }
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn RunnerStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_settings(mut self, settings: HarnessConfig) -> Self {
        self.settings = settings;
        self
    }

    /// Share host statics with other runners.
    pub fn with_host_statics(mut self, host: HostStatics) -> Self {
        self.host = host;
        self
    }

    /// Share the shadow table cache with other runners.
    pub fn with_shadow_cache(mut self, cache: ShadowTableCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn class(&self) -> &dyn TestClass {
        self.class.as_ref()
    }

    /// Environment of the last run, if one was built.
    pub fn environment(&self) -> Option<&SdkEnvironment> {
        self.environment.as_ref()
    }

    /// True when no per-class state of the last run is still reachable.
    pub fn all_state_is_cleared(&self) -> bool {
        self.lifecycle.is_none()
            && self
                .environment
                .as_ref()
                .map_or(true, SdkEnvironment::all_state_is_cleared)
    }

    /// Run the class. Never panics on behalf of user code or listeners; every failure
    /// ends up in the returned report and on the notifier.
    pub fn run(&mut self, notifier: &RunNotifier) -> ClassReport {
        let class = self.class.class_name().clone();
        let span = tracing::info_span!("test_class", class = %class);
        let _enter = span.enter();

        // A rerun never reports the environment of an earlier run.
        self.environment = None;

        let mut report = ClassReport::started(class.clone());
        record_listener_panics(notifier.fire_class_started(&class), &mut report);
        tracing::info!("Class run started");

        match self.initialize() {
            Ok(methods) => {
                self.run_methods(&methods, notifier, &mut report);
                self.terminate(notifier, &mut report);
            }
            Err(error) => {
                tracing::warn!(stage = error.stage(), error = %error, "Class initialization failed");
                let failure = Failure::for_class(
                    &class,
                    FailureKind::Initialization,
                    error.stage(),
                    error.to_string(),
                );
                let panics = notifier.fire_class_initialization_failed(&failure);
                report.initialization_failure = Some(failure);
                record_listener_panics(panics, &mut report);
            }
        }

        report.environment = self.environment.as_ref().map(SdkEnvironment::id);
        self.teardown(notifier, &mut report);
        report.finished_at = chrono::Utc::now();

        tracing::info!(
            passed = report.passed_count(),
            failed = report.failed_count(),
            ignored = report.ignored_count(),
            state_cleared = report.state_cleared,
            "Class run finished"
        );
        let panics = notifier.fire_class_finished(&report);
        record_listener_panics(panics, &mut report);
        report
    }

    /// Everything up to and including `on_create`. Returns the methods to run.
    fn initialize(&mut self) -> InitializationResult<Vec<TestMethod>> {
        let methods = guard::catch(|| self.class.test_methods())
            .map_err(|m| InitializationError::panicked("test_methods", m))?;
        let config = guard::catch(|| self.class.config())
            .map_err(|m| InitializationError::panicked("config", m))?;
        let base_dir = config
            .manifest_dir
            .clone()
            .unwrap_or_else(|| self.settings.base_dir.clone());
        let strategy = Arc::clone(&self.strategy);
        let settings = &self.settings;

        let manifest = guard::catch(|| strategy.create_app_manifest(settings, &base_dir))
            .map_err(|m| InitializationError::panicked("create_app_manifest", m))?
            .map_err(InitializationError::ManifestResolution)?;
        let policy = guard::catch(|| strategy.create_setup(settings))
            .map_err(|m| InitializationError::panicked("create_setup", m))?;
        let lifecycle = guard::catch(|| strategy.create_test_lifecycle())
            .map_err(|m| InitializationError::panicked("create_test_lifecycle", m))?;

        let environment = self.environment.insert(
            SdkEnvironment::new(manifest, policy)
                .with_host_statics(self.host.clone())
                .with_shadow_cache(self.cache.clone())
                .with_default_shadows(settings.default_shadows.clone()),
        );
        let lifecycle = self.lifecycle.insert(lifecycle);

        tracing::debug!(environment = %environment.id(), "configure_shadows");
        guard::catch(|| strategy.configure_shadows(environment, &config))
            .map_err(|m| InitializationError::panicked("configure_shadows", m))?
            .map_err(InitializationError::Configuration)?;
        if !environment.is_configured() {
            return Err(InitializationError::BaseConfigurationSkipped);
        }

        tracing::debug!("create_application");
        let manifest = environment.manifest().cloned();
        let application = guard::catch(|| lifecycle.create_application(methods.first(), manifest.as_ref()))
            .map_err(|m| InitializationError::panicked("create_application", m))?
            .map_err(InitializationError::CreateApplication)?;

        if let Some(application) = application {
            environment
                .set_application(application)
                .map_err(InitializationError::Configuration)?;
        }
        if let Some(application) = environment.application_mut() {
            tracing::debug!("on_create");
            guard::catch(|| application.on_create())
                .map_err(|m| InitializationError::panicked("on_create", m))?
                .map_err(InitializationError::OnCreate)?;
        }
        Ok(methods)
    }

    fn run_methods(&mut self, methods: &[TestMethod], notifier: &RunNotifier, report: &mut ClassReport) {
        let (Some(environment), Some(lifecycle)) =
            (self.environment.as_mut(), self.lifecycle.as_deref_mut())
        else {
            return;
        };

        for method in methods {
            if method.ignored {
                tracing::debug!(method = %method.name, "Test ignored");
                let panics = notifier.fire_test_ignored(method);
                report.methods.push(MethodOutcome::ignored(method.clone()));
                record_listener_panics(panics, report);
                continue;
            }

            record_listener_panics(notifier.fire_test_started(method), report);
            let outcome = run_method(self.class.as_ref(), environment, lifecycle, method);
            for failure in &outcome.failures {
                tracing::warn!(method = %method.name, stage = %failure.stage, error = %failure.message, "Test failed");
            }
            let panics = notifier.fire_test_finished(&outcome);
            report.methods.push(outcome);
            record_listener_panics(panics, report);
        }
    }

    fn terminate(&mut self, notifier: &RunNotifier, report: &mut ClassReport) {
        let Some(application) = self
            .environment
            .as_mut()
            .and_then(SdkEnvironment::application_mut)
        else {
            return;
        };
        tracing::debug!("on_terminate");
        if let Err(fault) = guard::attempt("on_terminate", || application.on_terminate()) {
            record_teardown_failure(fault, notifier, report);
        }
    }

    /// Release the hook set and the environment, retrying while user
    /// `Drop` impls panic.
    fn teardown(&mut self, notifier: &RunNotifier, report: &mut ClassReport) {
        if let Some(lifecycle) = self.lifecycle.take() {
            if let Err(fault) = guard::release("drop_lifecycle", lifecycle) {
                record_teardown_failure(fault, notifier, report);
            }
        }

        if let Some(environment) = self.environment.as_mut() {
            for _ in 0..MAX_CLEAR_ATTEMPTS {
                match guard::catch(|| environment.clear()) {
                    Ok(()) => break,
                    Err(message) => record_teardown_failure(
                        Fault {
                            stage: "clear",
                            message: format!("panicked: {message}"),
                        },
                        notifier,
                        report,
                    ),
                }
            }
        }

        report.state_cleared = self.all_state_is_cleared();
        if !report.state_cleared {
            tracing::warn!("Per-class state still reachable after teardown");
        }
    }
}

impl std::fmt::Debug for SandboxRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SandboxRunner")
            .field("class", self.class.class_name())
            .field("environment", &self.environment)
            .finish()
    }
}

/// `prepare_test`, `before_test`, the test itself and `after_test` for one
/// method. `after_test` runs whatever happened before it.
fn run_method(
    class: &dyn TestClass,
    environment: &mut SdkEnvironment,
    lifecycle: &mut dyn TestLifecycle,
    method: &TestMethod,
) -> MethodOutcome {
    let started = Instant::now();
    let mut failures = Vec::new();

    let ready = guard::attempt("instantiate", || class.instantiate()).and_then(|mut instance| {
        tracing::debug!(method = %method.name, "prepare_test");
        guard::attempt("prepare_test", || lifecycle.prepare_test(instance.as_mut()))?;
        tracing::debug!(method = %method.name, "before_test");
        guard::attempt("before_test", || lifecycle.before_test(method))?;
        Ok(instance)
    });

    match ready {
        Ok(mut instance) => {
            if let Err(fault) = guard::attempt("test", || instance.invoke(method, environment)) {
                failures.push(Failure::for_method(method, FailureKind::Test, fault.stage, fault.message));
            }
            if let Err(fault) = guard::release("drop_test_instance", instance) {
                failures.push(Failure::for_method(method, FailureKind::Teardown, fault.stage, fault.message));
            }
        }
        Err(fault) => {
            failures.push(Failure::for_method(method, FailureKind::Test, fault.stage, fault.message));
        }
    }

    tracing::debug!(method = %method.name, "after_test");
    if let Err(fault) = guard::attempt("after_test", || lifecycle.after_test(method)) {
        failures.push(Failure::for_method(method, FailureKind::Teardown, fault.stage, fault.message));
    }

    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    MethodOutcome::finished(method.clone(), failures, duration_ms)
}

fn record_teardown_failure(fault: Fault, notifier: &RunNotifier, report: &mut ClassReport) {
    tracing::warn!(stage = fault.stage, error = %fault.message, "Class teardown failed");
    let failure = Failure::for_class(&report.class, FailureKind::Teardown, fault.stage, fault.message);
    let panics = notifier.fire_class_teardown_failed(&failure);
    report.teardown_failures.push(failure);
    record_listener_panics(panics, report);
}

/// Listener panics are contained and kept as class teardown failures; they
/// are not announced to the listeners again.
fn record_listener_panics(panics: Vec<String>, report: &mut ClassReport) {
    for message in panics {
        tracing::warn!(error = %message, "Run listener panicked");
        let failure = Failure::for_class(&report.class, FailureKind::Teardown, "listener", message);
        report.teardown_failures.push(failure);
    }
}
