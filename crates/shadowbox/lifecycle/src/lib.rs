#![deny(unsafe_code)]
//! # shadowbox-lifecycle
//!
//! Test lifecycle hooks for Shadowbox
//!
//! Two extension points live here:
//!
//! - [`TestLifecycle`]: the hook set around application creation and each
//!   test method (`create_application`, `prepare_test`, `before_test`,
//!   `after_test`), with [`DefaultTestLifecycle`] as the minimal
//!   implementation
//! - [`TestClass`] / [`TestInstance`]: how a test subject exposes its test
//!   methods to the runner; [`FnTestClass`] builds one from closures
//!
//! The [`Application`] trait is re-exported from the environment, which
//! owns the application object for the duration of a class run.

pub mod error;
pub mod lifecycle;
pub mod subject;

pub use error::{LifecycleError, LifecycleResult, TestError, TestResult};
pub use lifecycle::{DefaultTestLifecycle, TestLifecycle};
pub use shadowbox_environment::{Application, ApplicationError, DefaultApplication};
pub use subject::{FnTestClass, FnTestInstance, TestClass, TestInstance};
