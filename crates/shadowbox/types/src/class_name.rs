use serde::{Deserialize, Serialize};
use std::fmt;

/// Fully-qualified name of a class, e.g. `android.app.Application`.
///
/// Nested classes use `$` as separator (`com.example.Outer$Inner`); the
/// package is everything before the last `.`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassName(String);

impl ClassName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Package portion of the name, empty for classes in the default package.
    pub fn package(&self) -> &str {
        match self.0.rfind('.') {
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }

    /// Name without the package.
    pub fn simple_name(&self) -> &str {
        match self.0.rfind('.') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Whether this class lives in `package` or one of its sub-packages.
    ///
    /// `package` may be given with or without the trailing dot.
    pub fn in_package(&self, package: &str) -> bool {
        let package = package.trim_end_matches('.');
        if package.is_empty() {
            return true;
        }
        self.0.len() > package.len()
            && self.0.starts_with(package)
            && self.0.as_bytes()[package.len()] == b'.'
    }

    /// Name of a nested class, `Outer$Inner`.
    pub fn nested(&self, inner: &str) -> Self {
        Self(format!("{}${}", self.0, inner))
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClassName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ClassName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ClassName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
