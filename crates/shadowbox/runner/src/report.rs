//! Results of a class run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shadowbox_environment::EnvironmentId;
use shadowbox_types::{ClassName, TestMethod};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The class could not be set up; no method ran
    Initialization,
    /// A test method (or the steps that prepare it) failed
    Test,
    /// `after_test`, `on_terminate` or environment teardown failed
    Teardown,
}

/// One reported failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub class: ClassName,
    /// `None` for class-level failures
    pub method: Option<TestMethod>,
    pub kind: FailureKind,
    /// Step that failed, e.g. `before_test` or `clear`
    pub stage: String,
    pub message: String,
}

impl Failure {
    pub fn for_class(
        class: &ClassName,
        kind: FailureKind,
        stage: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            class: class.clone(),
            method: None,
            kind,
            stage: stage.into(),
            message: message.into(),
        }
    }

    pub fn for_method(
        method: &TestMethod,
        kind: FailureKind,
        stage: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            class: method.class.clone(),
            method: Some(method.clone()),
            kind,
            stage: stage.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            Some(method) => write!(f, "{method} [{}]: {}", self.stage, self.message),
            None => write!(f, "{} [{}]: {}", self.class, self.stage, self.message),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodStatus {
    Passed,
    Failed,
    Ignored,
}

/// Result of one test method.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodOutcome {
    pub method: TestMethod,
    pub status: MethodStatus,
    /// Every failure attributed to this method, in the order they happened
    pub failures: Vec<Failure>,
    pub duration_ms: u64,
}

impl MethodOutcome {
    pub fn ignored(method: TestMethod) -> Self {
        Self {
            method,
            status: MethodStatus::Ignored,
            failures: Vec::new(),
            duration_ms: 0,
        }
    }

    pub(crate) fn finished(method: TestMethod, failures: Vec<Failure>, duration_ms: u64) -> Self {
        let status = if failures.is_empty() {
            MethodStatus::Passed
        } else {
            MethodStatus::Failed
        };
        Self {
            method,
            status,
            failures,
            duration_ms,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == MethodStatus::Passed
    }
}

/// Everything that happened while running one test class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassReport {
    pub class: ClassName,
    pub environment: Option<EnvironmentId>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Set when the class was aborted before any method ran
    pub initialization_failure: Option<Failure>,
    pub methods: Vec<MethodOutcome>,
    /// Class-level teardown failures (`on_terminate`, clearing the environment)
    pub teardown_failures: Vec<Failure>,
    /// Whether the environment reported all per-class state released
    pub state_cleared: bool,
}

impl ClassReport {
    pub(crate) fn started(class: ClassName) -> Self {
        let now = Utc::now();
        Self {
            class,
            environment: None,
            started_at: now,
            finished_at: now,
            initialization_failure: None,
            methods: Vec::new(),
            teardown_failures: Vec::new(),
            state_cleared: false,
        }
    }

    pub fn passed_count(&self) -> usize {
        self.count(MethodStatus::Passed)
    }

    pub fn failed_count(&self) -> usize {
        self.count(MethodStatus::Failed)
    }

    pub fn ignored_count(&self) -> usize {
        self.count(MethodStatus::Ignored)
    }

    fn count(&self, status: MethodStatus) -> usize {
        self.methods.iter().filter(|m| m.status == status).count()
    }

    pub fn outcome(&self, method: &str) -> Option<&MethodOutcome> {
        self.methods.iter().find(|m| m.method.name == method)
    }

    /// All failures in report order: initialisation, per method, teardown.
    pub fn failures(&self) -> impl Iterator<Item = &Failure> {
        self.initialization_failure
            .iter()
            .chain(self.methods.iter().flat_map(|m| m.failures.iter()))
            .chain(self.teardown_failures.iter())
    }

    pub fn is_success(&self) -> bool {
        self.state_cleared && self.failures().next().is_none()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
