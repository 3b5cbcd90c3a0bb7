//! Extension points of a class run
//!
//! Each step the runner delegates is a method on [`RunnerStrategy`] with a
//! default implementation, so a harness overrides only the steps it needs.

use shadowbox_environment::{
    DefaultPolicy, EnvironmentResult, FsManifestResolver, InstantiationPolicy, ManifestResolver,
    PolicyExt, SdkEnvironment,
};
use shadowbox_lifecycle::{DefaultTestLifecycle, TestLifecycle};
use shadowbox_types::{HarnessConfig, ManifestDescriptor, TestConfig};
use std::path::Path;
use std::sync::Arc;

pub trait RunnerStrategy: Send + Sync {
    /// Build the instantiation policy for one class run.
    fn create_setup(&self, settings: &HarnessConfig) -> Arc<dyn InstantiationPolicy> {
        DefaultPolicy::from_config(settings).into_shared()
    }

    /// Resolve the manifest relative to `base_dir`; `Ok(None)` runs without one.
    fn create_app_manifest(
        &self,
        settings: &HarnessConfig,
        base_dir: &Path,
    ) -> EnvironmentResult<Option<ManifestDescriptor>> {
        FsManifestResolver::from_config(settings).resolve(base_dir)
    }

    /// Hook set for one class run.
    fn create_test_lifecycle(&self) -> Box<dyn TestLifecycle> {
        Box::new(DefaultTestLifecycle)
    }

    /// Configure the environment for the class.
    ///
    /// Overrides may add work around it but must still end up calling
    /// [`SdkEnvironment::configure`]; the runner rejects an environment that
    /// is left unconfigured.
    fn configure_shadows(
        &self,
        environment: &mut SdkEnvironment,
        config: &TestConfig,
    ) -> EnvironmentResult<()> {
        environment.configure(config)
    }
}

/// Strategy with every step at its default.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultRunnerStrategy;

impl RunnerStrategy for DefaultRunnerStrategy {}
