//! Shared fixtures for the runner integration tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use shadowbox_environment::{
    Application, ApplicationError, DefaultPolicy, EnvironmentResult, HostStatics,
    InstantiationPolicy, PolicyExt, SdkEnvironment,
};
use shadowbox_lifecycle::{
    FnTestClass, FnTestInstance, LifecycleError, LifecycleResult, TestClass, TestError,
    TestInstance, TestLifecycle,
};
use shadowbox_runner::{RunnerStrategy, SandboxRunner};
use shadowbox_testkit::Transcript;
use shadowbox_types::{ClassName, HarnessConfig, ManifestDescriptor, TestConfig, TestMethod};
use std::path::Path;
use std::sync::Arc;

pub const TEST_CLASS: &str = "org.shadowbox.testing.LifecycleTest";

/// Holds the transcript; exempted so tests and hooks see the same one.
pub const STATE_HOLDER: &str = "org.shadowbox.testing.StateHolder";

pub fn state_holder() -> ClassName {
    ClassName::new(STATE_HOLDER)
}

/// Settings that load `org.shadowbox` classes inside the environment.
pub fn settings() -> HarnessConfig {
    HarnessConfig::default().with_instrumented_package("org.shadowbox")
}

/// The transcript, as seen from inside a test method.
pub fn recorder(env: &mut SdkEnvironment) -> Result<Arc<Transcript>, TestError> {
    Ok(env.static_state(&state_holder(), Transcript::new)?)
}

/// Test body that records `TEST!`.
pub fn record_test(env: &mut SdkEnvironment) -> Result<(), TestError> {
    recorder(env)?.add("TEST!");
    Ok(())
}

/// A base directory with a manifest, a resource dir and an asset dir.
pub fn manifest_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("AndroidManifest.xml"), "<manifest/>").unwrap();
    std::fs::create_dir(dir.path().join("res")).unwrap();
    std::fs::create_dir(dir.path().join("assets")).unwrap();
    dir
}

/// Strategy whose hooks append to a transcript and fail on request.
///
/// Failure points are hook labels (`"beforeTest"`) or label and method
/// (`"afterTest:second"`). `"dropApplication"` makes the application panic
/// when it is dropped.
#[derive(Clone, Default)]
pub struct RecordingStrategy {
    pub transcript: Transcript,
    failing: Vec<String>,
    skip_base_configuration: bool,
    manifests: Arc<Mutex<Vec<Option<ManifestDescriptor>>>>,
    created_for: Arc<Mutex<Vec<Option<String>>>>,
}

impl RecordingStrategy {
    pub fn new(transcript: Transcript) -> Self {
        Self {
            transcript,
            ..Self::default()
        }
    }

    pub fn failing(mut self, point: impl Into<String>) -> Self {
        self.failing.push(point.into());
        self
    }

    pub fn skipping_base_configuration(mut self) -> Self {
        self.skip_base_configuration = true;
        self
    }

    /// Manifests passed to `create_application`, one per call.
    pub fn manifests_seen(&self) -> Vec<Option<ManifestDescriptor>> {
        self.manifests.lock().clone()
    }

    /// Method names passed to `create_application`, one per call.
    pub fn applications_created_for(&self) -> Vec<Option<String>> {
        self.created_for.lock().clone()
    }

    fn fails(&self, hook: &str, method: Option<&TestMethod>) -> bool {
        self.failing.iter().any(|point| {
            point == hook || method.is_some_and(|m| *point == format!("{hook}:{}", m.name))
        })
    }

    fn record(&self, hook: &str, method: Option<&TestMethod>) -> Result<(), String> {
        self.transcript.add(hook);
        if self.fails(hook, method) {
            Err(format!("scripted {hook} failure"))
        } else {
            Ok(())
        }
    }

    /// Runner wired with this strategy and a host that already holds the
    /// transcript under [`STATE_HOLDER`].
    pub fn runner(&self, class: impl TestClass + 'static) -> SandboxRunner {
        let host = HostStatics::new();
        host.install(&state_holder(), Arc::new(self.transcript.clone()));
        SandboxRunner::new(class)
            .with_strategy(Arc::new(self.clone()))
            .with_settings(settings())
            .with_host_statics(host)
    }
}

impl RunnerStrategy for RecordingStrategy {
    fn create_setup(&self, settings: &HarnessConfig) -> Arc<dyn InstantiationPolicy> {
        DefaultPolicy::from_config(settings)
            .exempting([STATE_HOLDER])
            .into_shared()
    }

    fn create_app_manifest(
        &self,
        settings: &HarnessConfig,
        base_dir: &Path,
    ) -> EnvironmentResult<Option<ManifestDescriptor>> {
        shadowbox_runner::DefaultRunnerStrategy.create_app_manifest(settings, base_dir)
    }

    fn create_test_lifecycle(&self) -> Box<dyn TestLifecycle> {
        Box::new(RecordingLifecycle {
            strategy: self.clone(),
        })
    }

    fn configure_shadows(&self, environment: &mut SdkEnvironment, config: &TestConfig) -> EnvironmentResult<()> {
        self.transcript.add("configureShadows");
        if self.skip_base_configuration {
            return Ok(());
        }
        environment.configure(config)
    }
}

struct RecordingLifecycle {
    strategy: RecordingStrategy,
}

impl TestLifecycle for RecordingLifecycle {
    fn create_application(
        &mut self,
        method: Option<&TestMethod>,
        manifest: Option<&ManifestDescriptor>,
    ) -> LifecycleResult<Option<Box<dyn Application>>> {
        self.strategy.manifests.lock().push(manifest.cloned());
        self.strategy
            .created_for
            .lock()
            .push(method.map(|m| m.name.clone()));
        self.strategy
            .record("createApplication", None)
            .map_err(|m| LifecycleError::hook("create_application", m))?;
        Ok(Some(Box::new(RecordingApplication {
            strategy: self.strategy.clone(),
        })))
    }

    fn prepare_test(&mut self, test: &mut dyn TestInstance) -> LifecycleResult<()> {
        let instance = test
            .as_any_mut()
            .downcast_mut::<FnTestInstance>()
            .ok_or_else(|| LifecycleError::hook("prepare_test", "unexpected instance type"))?;
        if instance.invocations() != 0 || instance.is_prepared() {
            return Err(LifecycleError::hook("prepare_test", "instance was reused"));
        }
        instance.mark_prepared();
        self.strategy
            .record("prepareTest", None)
            .map_err(|m| LifecycleError::hook("prepare_test", m))
    }

    fn before_test(&mut self, method: &TestMethod) -> LifecycleResult<()> {
        self.strategy
            .record("beforeTest", Some(method))
            .map_err(|m| LifecycleError::hook("before_test", m))
    }

    fn after_test(&mut self, method: &TestMethod) -> LifecycleResult<()> {
        self.strategy
            .record("afterTest", Some(method))
            .map_err(|m| LifecycleError::hook("after_test", m))
    }
}

struct RecordingApplication {
    strategy: RecordingStrategy,
}

impl Application for RecordingApplication {
    fn on_create(&mut self) -> Result<(), ApplicationError> {
        self.strategy.record("onCreate", None).map_err(ApplicationError::new)
    }

    fn on_terminate(&mut self) -> Result<(), ApplicationError> {
        self.strategy.record("onTerminate", None).map_err(ApplicationError::new)
    }
}

impl Drop for RecordingApplication {
    fn drop(&mut self) {
        if self.strategy.fails("dropApplication", None) && !std::thread::panicking() {
            panic!("application refused to release");
        }
    }
}
