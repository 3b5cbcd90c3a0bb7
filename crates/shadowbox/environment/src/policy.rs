//! Instantiation policies
//!
//! A policy answers one question: is this class loaded inside the simulated
//! environment (`true`) or taken from the host unmodified (`false`)?
//! Policies are immutable and deterministic so their answers can be cached
//! per environment. Customisation composes by delegation: a wrapper decides
//! the names it cares about and hands every other name to its parent.

use shadowbox_types::{ClassName, HarnessConfig};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Decides which classes execute under interception.
pub trait InstantiationPolicy: Send + Sync {
    /// `true` if `class` must be loaded inside the simulated environment.
    fn should_intercept(&self, class: &ClassName) -> bool;
}

impl<P: InstantiationPolicy + ?Sized> InstantiationPolicy for Arc<P> {
    fn should_intercept(&self, class: &ClassName) -> bool {
        (**self).should_intercept(class)
    }
}

impl<P: InstantiationPolicy + ?Sized> InstantiationPolicy for Box<P> {
    fn should_intercept(&self, class: &ClassName) -> bool {
        (**self).should_intercept(class)
    }
}

impl<P: InstantiationPolicy + ?Sized> InstantiationPolicy for &P {
    fn should_intercept(&self, class: &ClassName) -> bool {
        (**self).should_intercept(class)
    }
}

/// Intercepts the simulated platform's packages and any instrumented
/// application packages; everything else comes from the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefaultPolicy {
    packages: Vec<String>,
}

impl DefaultPolicy {
    /// Platform packages only.
    pub fn new() -> Self {
        Self::from_config(&HarnessConfig::default())
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        let packages = config
            .platform_packages
            .iter()
            .chain(config.instrumented_packages.iter())
            .map(|p| p.trim_end_matches('.').to_string())
            .filter(|p| !p.is_empty())
            .collect();
        Self { packages }
    }

    /// Also intercept classes in `package`.
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        let package = package.into();
        let package = package.trim_end_matches('.');
        if !package.is_empty() {
            self.packages.push(package.to_string());
        }
        self
    }

    pub fn packages(&self) -> &[String] {
        &self.packages
    }
}

impl Default for DefaultPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl InstantiationPolicy for DefaultPolicy {
    fn should_intercept(&self, class: &ClassName) -> bool {
        self.packages.iter().any(|p| class.in_package(p))
    }
}

/// Keeps selected classes on the host, delegating everything else.
///
/// Used for test-support classes whose static state must stay identical on
/// both sides of the environment boundary.
#[derive(Clone, Debug)]
pub struct ExemptingPolicy<P> {
    parent: P,
    classes: BTreeSet<ClassName>,
    packages: Vec<String>,
}

impl<P: InstantiationPolicy> ExemptingPolicy<P> {
    pub fn new(parent: P) -> Self {
        Self {
            parent,
            classes: BTreeSet::new(),
            packages: Vec::new(),
        }
    }

    pub fn exempt(mut self, class: impl Into<ClassName>) -> Self {
        self.classes.insert(class.into());
        self
    }

    pub fn exempt_package(mut self, package: impl Into<String>) -> Self {
        self.packages
            .push(package.into().trim_end_matches('.').to_string());
        self
    }

    pub fn parent(&self) -> &P {
        &self.parent
    }

    fn exempts(&self, class: &ClassName) -> bool {
        self.classes.contains(class) || self.packages.iter().any(|p| class.in_package(p))
    }
}

impl<P: InstantiationPolicy> InstantiationPolicy for ExemptingPolicy<P> {
    fn should_intercept(&self, class: &ClassName) -> bool {
        if self.exempts(class) {
            return false;
        }
        self.parent.should_intercept(class)
    }
}

/// Forces selected classes into the environment, delegating everything else.
#[derive(Clone, Debug)]
pub struct InterceptingPolicy<P> {
    parent: P,
    classes: BTreeSet<ClassName>,
}

impl<P: InstantiationPolicy> InterceptingPolicy<P> {
    pub fn new(parent: P) -> Self {
        Self {
            parent,
            classes: BTreeSet::new(),
        }
    }

    pub fn intercept(mut self, class: impl Into<ClassName>) -> Self {
        self.classes.insert(class.into());
        self
    }

    pub fn parent(&self) -> &P {
        &self.parent
    }
}

impl<P: InstantiationPolicy> InstantiationPolicy for InterceptingPolicy<P> {
    fn should_intercept(&self, class: &ClassName) -> bool {
        self.classes.contains(class) || self.parent.should_intercept(class)
    }
}

/// Builder helpers for wrapping a policy.
pub trait PolicyExt: InstantiationPolicy + Sized {
    fn exempting<I, C>(self, classes: I) -> ExemptingPolicy<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<ClassName>,
    {
        classes
            .into_iter()
            .fold(ExemptingPolicy::new(self), |policy, class| policy.exempt(class))
    }

    fn intercepting<I, C>(self, classes: I) -> InterceptingPolicy<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<ClassName>,
    {
        classes
            .into_iter()
            .fold(InterceptingPolicy::new(self), |policy, class| {
                policy.intercept(class)
            })
    }

    fn into_shared(self) -> Arc<dyn InstantiationPolicy>
    where
        Self: 'static,
    {
        Arc::new(self)
    }
}

impl<P: InstantiationPolicy> PolicyExt for P {}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ClassName {
        ClassName::new(s)
    }

    #[test]
    fn default_intercepts_platform_packages_only() {
        let p = DefaultPolicy::new();
        assert!(p.should_intercept(&name("android.app.Application")));
        assert!(p.should_intercept(&name("com.android.internal.R")));
        assert!(p.should_intercept(&name("dalvik.system.VMRuntime")));
        assert!(!p.should_intercept(&name("java.lang.String")));
        assert!(!p.should_intercept(&name("androidx.core.Foo")));
        assert!(!p.should_intercept(&name("com.example.MyTest")));
    }

    #[test]
    fn default_includes_instrumented_packages() {
        let config = HarnessConfig::default().with_instrumented_package("com.example.");
        let p = DefaultPolicy::from_config(&config);
        assert!(p.should_intercept(&name("com.example.MyTest")));
        assert!(p.should_intercept(&name("com.example.MyTest$Inner")));
        assert!(!p.should_intercept(&name("com.examples.Other")));
    }

    #[test]
    fn exempting_overrides_only_named_classes() {
        let base = DefaultPolicy::new().with_package("com.example");
        let holder = name("com.example.SequenceTest$StateHolder");
        let p = ExemptingPolicy::new(base.clone()).exempt(holder.clone());

        assert!(!p.should_intercept(&holder));
        assert!(p.should_intercept(&name("com.example.SequenceTest")));
        assert!(p.should_intercept(&name("android.app.Activity")));
        assert!(!p.should_intercept(&name("java.util.List")));
    }

    #[test]
    fn exempting_whole_package() {
        let p = DefaultPolicy::new().exempting(Vec::<ClassName>::new()).exempt_package("android.util.");
        assert!(!p.should_intercept(&name("android.util.Log")));
        assert!(p.should_intercept(&name("android.os.Bundle")));
    }

    #[test]
    fn intercepting_forces_named_classes() {
        let p = DefaultPolicy::new().intercepting(["org.json.JSONObject"]);
        assert!(p.should_intercept(&name("org.json.JSONObject")));
        assert!(!p.should_intercept(&name("org.json.JSONArray")));
        assert!(p.should_intercept(&name("android.os.Bundle")));
    }

    #[test]
    fn nearest_override_wins() {
        let class = name("android.util.Log");
        let p = DefaultPolicy::new()
            .exempting([class.clone()])
            .intercepting([class.clone()]);
        assert!(p.should_intercept(&class));

        let q = DefaultPolicy::new()
            .intercepting([class.clone()])
            .exempting([class.clone()]);
        assert!(!q.should_intercept(&class));
    }

    #[test]
    fn shared_and_boxed_policies_delegate() {
        let shared: Arc<dyn InstantiationPolicy> = DefaultPolicy::new().into_shared();
        let wrapped = ExemptingPolicy::new(Arc::clone(&shared)).exempt("android.os.Looper");
        assert!(!wrapped.should_intercept(&name("android.os.Looper")));
        assert!(wrapped.should_intercept(&name("android.os.Handler")));

        let boxed: Box<dyn InstantiationPolicy> = Box::new(wrapped);
        assert!(boxed.should_intercept(&name("android.os.Handler")));
        assert!((&boxed).should_intercept(&name("android.os.Handler")));
    }
}
