use shadowbox_environment::{ApplicationError, EnvironmentError};
use shadowbox_lifecycle::LifecycleError;

/// Failure that aborts a whole test class before any test method runs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InitializationError {
    #[error("manifest resolution failed: {0}")]
    ManifestResolution(EnvironmentError),

    #[error("environment configuration failed: {0}")]
    Configuration(EnvironmentError),

    #[error("configure_shadows returned without configuring the environment")]
    BaseConfigurationSkipped,

    #[error("application creation failed: {0}")]
    CreateApplication(LifecycleError),

    #[error("application on_create failed: {0}")]
    OnCreate(ApplicationError),

    #[error("{stage} panicked: {message}")]
    Panicked { stage: String, message: String },
}

impl InitializationError {
    pub fn panicked(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Panicked {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Name of the initialisation step that failed.
    pub fn stage(&self) -> &str {
        match self {
            Self::ManifestResolution(_) => "create_app_manifest",
            Self::Configuration(_) | Self::BaseConfigurationSkipped => "configure_shadows",
            Self::CreateApplication(_) => "create_application",
            Self::OnCreate(_) => "on_create",
            Self::Panicked { stage, .. } => stage,
        }
    }
}

pub type InitializationResult<T> = Result<T, InitializationError>;
