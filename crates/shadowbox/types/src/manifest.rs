use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Resolved application manifest for a test subject.
///
/// Absence of a descriptor is a supported configuration, so callers hold
/// `Option<ManifestDescriptor>` rather than an empty descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDescriptor {
    /// The manifest file itself
    pub package_root: Option<PathBuf>,
    /// Resource directory
    pub resource_root: Option<PathBuf>,
    /// Asset directory
    pub asset_root: Option<PathBuf>,
}

impl ManifestDescriptor {
    pub fn new(
        package_root: impl Into<PathBuf>,
        resource_root: impl Into<PathBuf>,
        asset_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            package_root: Some(package_root.into()),
            resource_root: Some(resource_root.into()),
            asset_root: Some(asset_root.into()),
        }
    }

    pub fn package_root(&self) -> Option<&Path> {
        self.package_root.as_deref()
    }

    pub fn resource_root(&self) -> Option<&Path> {
        self.resource_root.as_deref()
    }

    pub fn asset_root(&self) -> Option<&Path> {
        self.asset_root.as_deref()
    }
}
