use crate::ClassName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A test method discovered on a test class.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestMethod {
    /// Declaring test class
    pub class: ClassName,
    /// Method name
    pub name: String,
    /// Ignored methods are reported but never run
    #[serde(default)]
    pub ignored: bool,
}

impl TestMethod {
    pub fn new(class: ClassName, name: impl Into<String>) -> Self {
        Self {
            class,
            name: name.into(),
            ignored: false,
        }
    }

    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }
}

impl fmt::Display for TestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.class, self.name)
    }
}
