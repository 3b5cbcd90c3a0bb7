use shadowbox_environment::{ApplicationError, EnvironmentError};

/// Failure raised by a lifecycle hook.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("{hook} failed: {message}")]
    HookFailed { hook: String, message: String },

    #[error(transparent)]
    Application(#[from] ApplicationError),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),
}

impl LifecycleError {
    pub fn hook(hook: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HookFailed {
            hook: hook.into(),
            message: message.into(),
        }
    }
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Failure raised by a test method or while constructing its instance.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TestError {
    #[error("assertion failed: {0}")]
    Assertion(String),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error("no such test method: {0}")]
    UnknownMethod(String),
}

impl TestError {
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }
}

pub type TestResult = Result<(), TestError>;
