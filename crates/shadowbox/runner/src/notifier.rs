//! Result reporting
//!
//! A [`RunNotifier`] fans events out to every registered [`RunListener`].
//! Listeners take `&self` because a notifier may be shared by classes
//! running on several threads.

use crate::guard;
use crate::report::{ClassReport, Failure, MethodOutcome, MethodStatus};
use parking_lot::Mutex;
use shadowbox_types::{ClassName, TestMethod};
use std::sync::Arc;

/// Receives run events. Every method defaults to doing nothing.
#[allow(unused_variables)]
pub trait RunListener: Send + Sync {
    fn class_started(&self, class: &ClassName) {}
    fn test_started(&self, method: &TestMethod) {}
    fn test_finished(&self, outcome: &MethodOutcome) {}
    fn test_ignored(&self, method: &TestMethod) {}
    /// The class was aborted before any method ran.
    fn class_initialization_failed(&self, failure: &Failure) {}
    fn class_teardown_failed(&self, failure: &Failure) {}
    fn class_finished(&self, report: &ClassReport) {}
}

#[derive(Clone, Default)]
pub struct RunNotifier {
    listeners: Vec<Arc<dyn RunListener>>,
}

impl RunNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listener(mut self, listener: Arc<dyn RunListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn add_listener(&mut self, listener: Arc<dyn RunListener>) {
        self.listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // Each `fire_*` returns the messages of listeners that panicked; one
    // panicking listener never keeps the others from being called.

    pub fn fire_class_started(&self, class: &ClassName) -> Vec<String> {
        self.each("class_started", |l| l.class_started(class))
    }

    pub fn fire_test_started(&self, method: &TestMethod) -> Vec<String> {
        self.each("test_started", |l| l.test_started(method))
    }

    pub fn fire_test_finished(&self, outcome: &MethodOutcome) -> Vec<String> {
        self.each("test_finished", |l| l.test_finished(outcome))
    }

    pub fn fire_test_ignored(&self, method: &TestMethod) -> Vec<String> {
        self.each("test_ignored", |l| l.test_ignored(method))
    }

    pub fn fire_class_initialization_failed(&self, failure: &Failure) -> Vec<String> {
        self.each("class_initialization_failed", |l| {
            l.class_initialization_failed(failure)
        })
    }

    pub fn fire_class_teardown_failed(&self, failure: &Failure) -> Vec<String> {
        self.each("class_teardown_failed", |l| l.class_teardown_failed(failure))
    }

    pub fn fire_class_finished(&self, report: &ClassReport) -> Vec<String> {
        self.each("class_finished", |l| l.class_finished(report))
    }

    fn each(&self, event: &str, call: impl Fn(&dyn RunListener)) -> Vec<String> {
        self.listeners
            .iter()
            .filter_map(|listener| guard::catch(|| call(listener.as_ref())).err())
            .map(|message| format!("{event} listener panicked: {message}"))
            .collect()
    }
}

impl std::fmt::Debug for RunNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[derive(Debug, Default)]
struct Tally {
    classes: usize,
    run: usize,
    ignored: usize,
    failures: Vec<Failure>,
    failed_methods: usize,
    initialization_failures: usize,
    teardown_failures: usize,
}

/// Listener that accumulates counts and failures across a run.
///
/// Clones share one tally.
#[derive(Clone, Debug, Default)]
pub struct RunResult {
    tally: Arc<Mutex<Tally>>,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// This result as a listener to register on a [`RunNotifier`].
    pub fn listener(&self) -> Arc<dyn RunListener> {
        Arc::new(self.clone())
    }

    /// Classes that finished, whether or not they succeeded.
    pub fn class_count(&self) -> usize {
        self.tally.lock().classes
    }

    /// Test methods that ran to completion (ignored methods excluded).
    pub fn run_count(&self) -> usize {
        self.tally.lock().run
    }

    pub fn ignore_count(&self) -> usize {
        self.tally.lock().ignored
    }

    pub fn failed_method_count(&self) -> usize {
        self.tally.lock().failed_methods
    }

    pub fn initialization_failure_count(&self) -> usize {
        self.tally.lock().initialization_failures
    }

    pub fn teardown_failure_count(&self) -> usize {
        self.tally.lock().teardown_failures
    }

    /// Every failure seen, in arrival order.
    pub fn failures(&self) -> Vec<Failure> {
        self.tally.lock().failures.clone()
    }

    pub fn was_successful(&self) -> bool {
        self.tally.lock().failures.is_empty()
    }
}

impl RunListener for RunResult {
    fn test_finished(&self, outcome: &MethodOutcome) {
        let mut tally = self.tally.lock();
        tally.run += 1;
        if outcome.status == MethodStatus::Failed {
            tally.failed_methods += 1;
            tally.failures.extend(outcome.failures.iter().cloned());
        }
    }

    fn test_ignored(&self, _method: &TestMethod) {
        self.tally.lock().ignored += 1;
    }

    fn class_initialization_failed(&self, failure: &Failure) {
        let mut tally = self.tally.lock();
        tally.initialization_failures += 1;
        tally.failures.push(failure.clone());
    }

    fn class_teardown_failed(&self, failure: &Failure) {
        let mut tally = self.tally.lock();
        tally.teardown_failures += 1;
        tally.failures.push(failure.clone());
    }

    fn class_finished(&self, _report: &ClassReport) {
        self.tally.lock().classes += 1;
    }
}
