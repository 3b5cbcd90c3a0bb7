//! Test subject contract
//!
//! A [`TestClass`] enumerates its test methods in a stable order and
//! constructs a fresh [`TestInstance`] for every method the runner invokes.

use crate::error::{TestError, TestResult};
use shadowbox_environment::SdkEnvironment;
use shadowbox_types::{ClassName, TestConfig, TestMethod};
use std::any::Any;
use std::sync::Arc;

/// One instance of a test class, used for a single test method.
pub trait TestInstance: Any {
    /// Run `method` inside `environment`.
    fn invoke(&mut self, method: &TestMethod, environment: &mut SdkEnvironment) -> TestResult;

    /// Access to the concrete type, for hooks that inject into the instance.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A class of tests run together in one environment.
pub trait TestClass: Send + Sync {
    fn class_name(&self) -> &ClassName;

    /// Test methods in discovery order.
    fn test_methods(&self) -> Vec<TestMethod>;

    /// Per-class settings.
    fn config(&self) -> TestConfig {
        TestConfig::default()
    }

    /// Construct a fresh instance.
    fn instantiate(&self) -> Result<Box<dyn TestInstance>, TestError>;
}

type TestBody = dyn Fn(&mut SdkEnvironment) -> TestResult + Send + Sync;

#[derive(Clone)]
struct FnTest {
    method: TestMethod,
    body: Arc<TestBody>,
}

/// Test class assembled from closures, one per test method.
///
/// ```rust
/// use shadowbox_lifecycle::{FnTestClass, TestClass};
///
/// let class = FnTestClass::new("com.example.CalculatorTest")
///     .test("adds", |_env| Ok(()))
///     .ignored_test("divides_by_zero", |_env| Ok(()));
///
/// let names: Vec<_> = class.test_methods().into_iter().map(|m| m.name).collect();
/// assert_eq!(names, ["adds", "divides_by_zero"]);
/// ```
#[derive(Clone)]
pub struct FnTestClass {
    name: ClassName,
    config: TestConfig,
    tests: Vec<FnTest>,
}

impl FnTestClass {
    pub fn new(name: impl Into<ClassName>) -> Self {
        Self {
            name: name.into(),
            config: TestConfig::default(),
            tests: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: TestConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a test method.
    pub fn test<F>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut SdkEnvironment) -> TestResult + Send + Sync + 'static,
    {
        let method = TestMethod::new(self.name.clone(), name);
        self.push(method, body)
    }

    /// Add a test method that is reported as ignored and never run.
    pub fn ignored_test<F>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut SdkEnvironment) -> TestResult + Send + Sync + 'static,
    {
        let method = TestMethod::new(self.name.clone(), name).ignored();
        self.push(method, body)
    }

    fn push<F>(mut self, method: TestMethod, body: F) -> Self
    where
        F: Fn(&mut SdkEnvironment) -> TestResult + Send + Sync + 'static,
    {
        self.tests.push(FnTest {
            method,
            body: Arc::new(body),
        });
        self
    }
}

impl TestClass for FnTestClass {
    fn class_name(&self) -> &ClassName {
        &self.name
    }

    fn test_methods(&self) -> Vec<TestMethod> {
        self.tests.iter().map(|t| t.method.clone()).collect()
    }

    fn config(&self) -> TestConfig {
        self.config.clone()
    }

    fn instantiate(&self) -> Result<Box<dyn TestInstance>, TestError> {
        Ok(Box::new(FnTestInstance {
            tests: self.tests.clone(),
            prepared: false,
            invocations: 0,
        }))
    }
}

/// Instance of a [`FnTestClass`].
pub struct FnTestInstance {
    tests: Vec<FnTest>,
    prepared: bool,
    invocations: usize,
}

impl FnTestInstance {
    /// Set by hooks that prepare the instance.
    pub fn mark_prepared(&mut self) {
        self.prepared = true;
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn invocations(&self) -> usize {
        self.invocations
    }
}

impl TestInstance for FnTestInstance {
    fn invoke(&mut self, method: &TestMethod, environment: &mut SdkEnvironment) -> TestResult {
        let body = self
            .tests
            .iter()
            .find(|t| t.method.name == method.name)
            .map(|t| Arc::clone(&t.body))
            .ok_or_else(|| TestError::UnknownMethod(method.to_string()))?;
        self.invocations += 1;
        tracing::debug!(method = %method, environment = %environment.id(), "Invoking test method");
        body(environment)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadowbox_environment::{DefaultPolicy, PolicyExt};

    fn environment() -> SdkEnvironment {
        let mut env = SdkEnvironment::new(None, DefaultPolicy::new().into_shared());
        env.configure(&TestConfig::default()).unwrap();
        env
    }

    #[test]
    fn methods_keep_declaration_order() {
        let class = FnTestClass::new("com.example.OrderTest")
            .test("b_second", |_| Ok(()))
            .test("a_first", |_| Ok(()))
            .ignored_test("c_skipped", |_| Ok(()));
        let methods = class.test_methods();
        assert_eq!(methods.len(), 3);
        assert_eq!(methods[0].name, "b_second");
        assert_eq!(methods[1].name, "a_first");
        assert!(methods[2].ignored);
        assert!(methods.iter().all(|m| m.class.as_str() == "com.example.OrderTest"));
    }

    #[test]
    fn invoke_runs_the_named_body() {
        let class = FnTestClass::new("com.example.InvokeTest")
            .test("passes", |_| Ok(()))
            .test("fails", |_| Err(TestError::assertion("nope")));
        let methods = class.test_methods();
        let mut env = environment();
        let mut instance = class.instantiate().unwrap();

        assert!(instance.invoke(&methods[0], &mut env).is_ok());
        assert_eq!(
            instance.invoke(&methods[1], &mut env),
            Err(TestError::assertion("nope"))
        );

        let concrete = instance
            .as_any_mut()
            .downcast_mut::<FnTestInstance>()
            .unwrap();
        assert_eq!(concrete.invocations(), 2);
        assert!(!concrete.is_prepared());
        concrete.mark_prepared();
        assert!(concrete.is_prepared());
    }

    #[test]
    fn unknown_method_is_an_error() {
        let class = FnTestClass::new("com.example.InvokeTest");
        let mut instance = class.instantiate().unwrap();
        let stray = TestMethod::new(ClassName::new("com.example.InvokeTest"), "missing");
        assert!(matches!(
            instance.invoke(&stray, &mut environment()),
            Err(TestError::UnknownMethod(_))
        ));
    }

    #[test]
    fn bodies_can_use_the_environment() {
        let class = FnTestClass::new("com.example.EnvTest").test("loads", |env| {
            let loaded = env.load_class(&ClassName::new("android.app.Activity"))?;
            if loaded.is_intercepted() {
                Ok(())
            } else {
                Err(TestError::assertion("activity should be intercepted"))
            }
        });
        let methods = class.test_methods();
        let mut instance = class.instantiate().unwrap();
        instance.invoke(&methods[0], &mut environment()).unwrap();
    }

    #[test]
    fn config_is_carried() {
        let class = FnTestClass::new("com.example.ConfigTest")
            .with_config(TestConfig::default().with_manifest_dir("fixtures/app"));
        assert_eq!(
            class.config().manifest_dir.as_deref(),
            Some(std::path::Path::new("fixtures/app"))
        );
    }
}
