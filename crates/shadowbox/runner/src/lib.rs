#![deny(unsafe_code)]
//! # shadowbox-runner
//!
//! Lifecycle orchestrator for Shadowbox
//!
//! [`SandboxRunner`] runs one test class inside a fresh [`SdkEnvironment`]:
//!
//! ```text
//! create_app_manifest → create_setup → configure_shadows → create_application
//!   → on_create → [prepare_test → before_test → test → after_test]×N
//!   → on_terminate → clear
//! ```
//!
//! Initialisation failures (everything up to `on_create`) abort the class and
//! are reported once; test and hook failures are attached to their method and
//! never stop the remaining methods. The environment is cleared on every path.
//!
//! Extension points are gathered in [`RunnerStrategy`]; results flow to
//! [`RunListener`]s through a [`RunNotifier`] and are returned as a
//! [`ClassReport`]. [`Suite`] runs several classes, optionally in parallel.
//!
//! [`SdkEnvironment`]: shadowbox_environment::SdkEnvironment

pub mod error;
mod guard;
pub mod notifier;
pub mod report;
pub mod runner;
pub mod strategy;
pub mod suite;

pub use error::{InitializationError, InitializationResult};
pub use notifier::{RunListener, RunNotifier, RunResult};
pub use report::{ClassReport, Failure, FailureKind, MethodOutcome, MethodStatus};
pub use runner::SandboxRunner;
pub use strategy::{DefaultRunnerStrategy, RunnerStrategy};
pub use suite::Suite;
