//! The application object owned by an environment.

/// Failure raised by an application lifecycle callback.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ApplicationError(pub String);

impl ApplicationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Opaque application object with lifecycle callbacks.
///
/// Both callbacks default to no-ops, so an implementation only overrides
/// the signals it cares about.
pub trait Application {
    /// Called once after creation, before any test method runs.
    fn on_create(&mut self) -> Result<(), ApplicationError> {
        Ok(())
    }

    /// Called once after every test method of the class has run.
    fn on_terminate(&mut self) -> Result<(), ApplicationError> {
        Ok(())
    }
}

/// Application with no behaviour.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultApplication;

impl Application for DefaultApplication {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_application_callbacks_succeed() {
        let mut app = DefaultApplication;
        assert!(app.on_create().is_ok());
        assert!(app.on_terminate().is_ok());
    }

    #[test]
    fn error_display_is_message() {
        assert_eq!(format!("{}", ApplicationError::new("boom")), "boom");
    }
}
