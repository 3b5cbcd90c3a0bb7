//! Harness configuration
//!
//! [`HarnessConfig`] is process-wide and loaded from TOML; [`TestConfig`]
//! is supplied per test class.

use crate::ClassName;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Binds a real platform class to the substitute used in its place.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShadowBinding {
    pub real: ClassName,
    pub shadow: ClassName,
}

impl ShadowBinding {
    pub fn new(real: impl Into<ClassName>, shadow: impl Into<ClassName>) -> Self {
        Self {
            real: real.into(),
            shadow: shadow.into(),
        }
    }
}

/// Process-wide harness settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Directory searched for the manifest when a test class gives none
    pub base_dir: PathBuf,
    /// Manifest file name inside the base directory
    pub manifest_file: String,
    /// Resource directory name inside the base directory
    pub resource_dir: String,
    /// Asset directory name inside the base directory
    pub asset_dir: String,
    /// Packages of the simulated platform; always loaded inside the environment
    pub platform_packages: Vec<String>,
    /// Additional packages loaded inside the environment (application code)
    pub instrumented_packages: Vec<String>,
    /// Shadow bindings applied to every test class
    pub default_shadows: Vec<ShadowBinding>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            manifest_file: "AndroidManifest.xml".into(),
            resource_dir: "res".into(),
            asset_dir: "assets".into(),
            platform_packages: vec!["android.".into(), "com.android.".into(), "dalvik.".into()],
            instrumented_packages: Vec::new(),
            default_shadows: Vec::new(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing path (or no path) yields the defaults.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_instrumented_package(mut self, package: impl Into<String>) -> Self {
        self.instrumented_packages.push(package.into());
        self
    }

    pub fn with_default_shadow(mut self, binding: ShadowBinding) -> Self {
        self.default_shadows.push(binding);
        self
    }
}

/// Per test class settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    /// Shadow bindings for this class; override defaults for the same real class
    pub shadows: Vec<ShadowBinding>,
    /// Directory to resolve the manifest from instead of the harness base dir
    pub manifest_dir: Option<PathBuf>,
}

impl TestConfig {
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn with_shadow(mut self, binding: ShadowBinding) -> Self {
        self.shadows.push(binding);
        self
    }

    pub fn with_manifest_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.manifest_dir = Some(dir.into());
        self
    }
}
