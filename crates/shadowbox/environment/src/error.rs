use shadowbox_types::ClassName;

/// Errors from building, configuring or using a simulated environment.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EnvironmentError {
    #[error("malformed manifest: {0}")]
    MalformedManifest(String),

    #[error("manifest lookup failed for {path}: {message}")]
    ManifestIo { path: String, message: String },

    #[error("conflicting shadows for {class}: {existing} and {requested}")]
    ConflictingShadow {
        class: ClassName,
        existing: ClassName,
        requested: ClassName,
    },

    #[error("shadow {shadow} bound to {class}, which is not loaded inside the environment")]
    ShadowNotIntercepted { class: ClassName, shadow: ClassName },

    #[error("environment already configured")]
    AlreadyConfigured,

    #[error("environment not configured")]
    NotConfigured,

    #[error("environment has been cleared")]
    Cleared,

    #[error("static state of {0} holds a different type")]
    StaticTypeMismatch(ClassName),
}

pub type EnvironmentResult<T> = Result<T, EnvironmentError>;
