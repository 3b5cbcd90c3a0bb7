//! Manifest resolution
//!
//! Resolution only locates the manifest file and its resource/asset roots;
//! the file formats themselves are read by other collaborators.

use crate::error::{EnvironmentError, EnvironmentResult};
use shadowbox_types::{HarnessConfig, ManifestDescriptor};
use std::path::{Path, PathBuf};

/// Locates the manifest for a test subject.
pub trait ManifestResolver: Send + Sync {
    /// Resolve relative to `base_dir`. `Ok(None)` means no manifest, which
    /// is a supported configuration.
    fn resolve(&self, base_dir: &Path) -> EnvironmentResult<Option<ManifestDescriptor>>;
}

/// Looks for `<base>/<manifest_file>` with sibling resource and asset dirs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FsManifestResolver {
    manifest_file: String,
    resource_dir: String,
    asset_dir: String,
}

impl FsManifestResolver {
    pub fn new(
        manifest_file: impl Into<String>,
        resource_dir: impl Into<String>,
        asset_dir: impl Into<String>,
    ) -> Self {
        Self {
            manifest_file: manifest_file.into(),
            resource_dir: resource_dir.into(),
            asset_dir: asset_dir.into(),
        }
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(
            config.manifest_file.clone(),
            config.resource_dir.clone(),
            config.asset_dir.clone(),
        )
    }

    fn existing(path: PathBuf) -> EnvironmentResult<Option<PathBuf>> {
        match path.try_exists() {
            Ok(true) => Ok(Some(path)),
            Ok(false) => Ok(None),
            Err(e) => Err(EnvironmentError::ManifestIo {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
        }
    }
}

impl Default for FsManifestResolver {
    fn default() -> Self {
        Self::from_config(&HarnessConfig::default())
    }
}

impl ManifestResolver for FsManifestResolver {
    fn resolve(&self, base_dir: &Path) -> EnvironmentResult<Option<ManifestDescriptor>> {
        let Some(package_root) = Self::existing(base_dir.join(&self.manifest_file))? else {
            tracing::debug!(base_dir = %base_dir.display(), "No manifest found");
            return Ok(None);
        };

        let descriptor = ManifestDescriptor {
            package_root: Some(package_root),
            resource_root: Self::existing(base_dir.join(&self.resource_dir))?,
            asset_root: Self::existing(base_dir.join(&self.asset_dir))?,
        };
        tracing::debug!(
            manifest = ?descriptor.package_root,
            resources = ?descriptor.resource_root,
            assets = ?descriptor.asset_root,
            "Manifest resolved"
        );
        Ok(Some(descriptor))
    }
}

/// Check that every root a descriptor names exists with the expected kind.
pub fn validate_manifest(manifest: &ManifestDescriptor) -> EnvironmentResult<()> {
    if let Some(path) = manifest.package_root() {
        if !path.is_file() {
            return Err(EnvironmentError::MalformedManifest(format!(
                "manifest file {} does not exist",
                path.display()
            )));
        }
    }
    for (label, root) in [
        ("resource", manifest.resource_root()),
        ("asset", manifest.asset_root()),
    ] {
        if let Some(path) = root {
            if !path.is_dir() {
                return Err(EnvironmentError::MalformedManifest(format!(
                    "{label} root {} is not a directory",
                    path.display()
                )));
            }
        }
    }
    Ok(())
}
