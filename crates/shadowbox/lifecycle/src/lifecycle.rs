//! The lifecycle hook set
//!
//! The runner calls these hooks in a fixed order for every test class:
//! `create_application` once, then `prepare_test`, `before_test`, the test
//! method and `after_test` for each method. A hook set is created once per
//! class run, so implementations may keep state scoped to that run.

use crate::error::LifecycleResult;
use crate::subject::TestInstance;
use shadowbox_environment::{Application, DefaultApplication};
use shadowbox_types::{ManifestDescriptor, TestMethod};

/// Extension point around application creation and each test method.
///
/// Every hook has a default, so implementations override only what they need.
pub trait TestLifecycle {
    /// Build the application object for the class run.
    ///
    /// Called once, before any test method runs. `method` is the first test
    /// method of the class, `None` for a class without methods. Returning
    /// `None` runs the class without an application.
    fn create_application(
        &mut self,
        method: Option<&TestMethod>,
        manifest: Option<&ManifestDescriptor>,
    ) -> LifecycleResult<Option<Box<dyn Application>>> {
        let _ = (method, manifest);
        Ok(Some(Box::new(DefaultApplication)))
    }

    /// Called with the freshly constructed test instance, before `before_test`.
    fn prepare_test(&mut self, test: &mut dyn TestInstance) -> LifecycleResult<()> {
        let _ = test;
        Ok(())
    }

    /// Called immediately before the test method is invoked.
    fn before_test(&mut self, method: &TestMethod) -> LifecycleResult<()> {
        let _ = method;
        Ok(())
    }

    /// Called after the test method, whether or not it failed.
    fn after_test(&mut self, method: &TestMethod) -> LifecycleResult<()> {
        let _ = method;
        Ok(())
    }
}

/// Minimal hook set: a no-op application and no per-test work.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultTestLifecycle;

impl TestLifecycle for DefaultTestLifecycle {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::{FnTestClass, TestClass};
    use shadowbox_types::ClassName;

    #[test]
    fn default_lifecycle_creates_an_application() {
        let mut lifecycle = DefaultTestLifecycle;
        let app = lifecycle.create_application(None, None).unwrap();
        let mut app = app.expect("default lifecycle creates an application");
        assert!(app.on_create().is_ok());
        assert!(app.on_terminate().is_ok());
    }

    #[test]
    fn default_hooks_are_no_ops() {
        let class = FnTestClass::new("com.example.NoopTest").test("works", |_| Ok(()));
        let method = TestMethod::new(ClassName::new("com.example.NoopTest"), "works");
        let mut instance = class.instantiate().unwrap();

        let mut lifecycle = DefaultTestLifecycle;
        lifecycle.prepare_test(instance.as_mut()).unwrap();
        lifecycle.before_test(&method).unwrap();
        lifecycle.after_test(&method).unwrap();
    }
}
