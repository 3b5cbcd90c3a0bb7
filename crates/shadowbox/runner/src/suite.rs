//! Running several test classes

use crate::notifier::RunNotifier;
use crate::report::ClassReport;
use crate::runner::SandboxRunner;
use crate::strategy::{DefaultRunnerStrategy, RunnerStrategy};
use parking_lot::Mutex;
use shadowbox_environment::{HostStatics, ShadowTableCache};
use shadowbox_lifecycle::TestClass;
use shadowbox_types::HarnessConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// An ordered set of test classes sharing one strategy, one set of host
/// statics and one shadow table cache. Every class still gets its own
/// environment and hook set.
pub struct Suite {
    classes: Vec<Arc<dyn TestClass>>,
    strategy: Arc<dyn RunnerStrategy>,
    settings: HarnessConfig,
    host: HostStatics,
    cache: ShadowTableCache,
}

impl Suite {
    pub fn new() -> Self {
        Self {
            classes: Vec::new(),
            strategy: Arc::new(DefaultRunnerStrategy),
            settings: HarnessConfig::default(),
            host: HostStatics::new(),
            cache: ShadowTableCache::new(),
        }
    }

    pub fn with_class(mut self, class: impl TestClass + 'static) -> Self {
        self.classes.push(Arc::new(class));
        self
    }

    pub fn add_class(&mut self, class: Arc<dyn TestClass>) {
        self.classes.push(class);
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn RunnerStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_settings(mut self, settings: HarnessConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_host_statics(mut self, host: HostStatics) -> Self {
        self.host = host;
        self
    }

    pub fn with_shadow_cache(mut self, cache: ShadowTableCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn host_statics(&self) -> &HostStatics {
        &self.host
    }

    pub fn shadow_cache(&self) -> &ShadowTableCache {
        &self.cache
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    fn runner_for(&self, class: &Arc<dyn TestClass>) -> SandboxRunner {
        SandboxRunner::from_shared(Arc::clone(class))
            .with_strategy(Arc::clone(&self.strategy))
            .with_settings(self.settings.clone())
            .with_host_statics(self.host.clone())
            .with_shadow_cache(self.cache.clone())
    }

    /// Run the classes one after another, in order.
    pub fn run(&self, notifier: &RunNotifier) -> Vec<ClassReport> {
        tracing::info!(classes = self.classes.len(), "Suite run started");
        self.classes
            .iter()
            .map(|class| self.runner_for(class).run(notifier))
            .collect()
    }

    /// Run the classes on up to `max_threads` worker threads.
    ///
    /// Each class runs start to finish on one worker. Reports come back in
    /// class order regardless of completion order.
    pub fn run_parallel(&self, notifier: &RunNotifier, max_threads: usize) -> Vec<ClassReport> {
        let workers = max_threads.clamp(1, self.classes.len().max(1));
        tracing::info!(classes = self.classes.len(), workers, "Parallel suite run started");

        let next = AtomicUsize::new(0);
        let slots: Mutex<Vec<Option<ClassReport>>> =
            Mutex::new((0..self.classes.len()).map(|_| None).collect());

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(class) = self.classes.get(index) else {
                        break;
                    };
                    let report = self.runner_for(class).run(notifier);
                    slots.lock()[index] = Some(report);
                });
            }
        });

        slots.into_inner().into_iter().flatten().collect()
    }
}

impl Default for Suite {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shadowbox_lifecycle::FnTestClass;

    #[test]
    fn runs_classes_in_order() {
        let suite = Suite::new()
            .with_class(FnTestClass::new("com.example.FirstTest").test("a", |_| Ok(())))
            .with_class(FnTestClass::new("com.example.SecondTest").test("b", |_| Ok(())));
        assert_eq!(suite.len(), 2);

        let reports = suite.run(&RunNotifier::new());
        let names: Vec<_> = reports.iter().map(|r| r.class.simple_name().to_string()).collect();
        assert_eq!(names, ["FirstTest", "SecondTest"]);
        assert!(reports.iter().all(ClassReport::is_success));
    }

    #[test]
    fn each_class_gets_its_own_environment() {
        let suite = Suite::new()
            .with_class(FnTestClass::new("com.example.FirstTest"))
            .with_class(FnTestClass::new("com.example.SecondTest"));
        let reports = suite.run(&RunNotifier::new());
        assert_ne!(reports[0].environment, reports[1].environment);
    }

    #[test]
    fn empty_suite() {
        let suite = Suite::default();
        assert!(suite.is_empty());
        assert!(suite.run(&RunNotifier::new()).is_empty());
        assert!(suite.run_parallel(&RunNotifier::new(), 4).is_empty());
    }
}
