//! Panic containment at the orchestrator boundary.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// A failed step: which stage, and what went wrong.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Fault {
    pub stage: &'static str,
    pub message: String,
}

impl Fault {
    fn new(stage: &'static str, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// Run `f`, turning a panic into its message.
pub(crate) fn catch<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(panic_message)
}

/// Run a fallible step; errors and panics both become a [`Fault`].
pub(crate) fn attempt<T, E: fmt::Display>(
    stage: &'static str,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, Fault> {
    match catch(f) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(Fault::new(stage, error.to_string())),
        Err(message) => Err(Fault::new(stage, format!("panicked: {message}"))),
    }
}

/// Drop `value`, reporting a panicking `Drop` as a fault.
pub(crate) fn release<T>(stage: &'static str, value: T) -> Result<(), Fault> {
    catch(move || drop(value)).map_err(|message| Fault::new(stage, format!("panicked: {message}")))
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
