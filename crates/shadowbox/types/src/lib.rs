#![deny(unsafe_code)]
//! # shadowbox-types
//!
//! Shared domain types for Shadowbox
//!
//! Shadowbox runs unit tests written against an unavailable platform API
//! inside a fresh simulated environment per test class. This crate holds the
//! plain data every other layer agrees on:
//!
//! - [`ClassName`]: fully-qualified class identity used by policies and shadows
//! - [`TestMethod`]: one discoverable test of a test class
//! - [`ManifestDescriptor`]: resolved package/resource/asset roots
//! - [`ShadowBinding`]: maps a real platform class to its substitute
//! - [`HarnessConfig`] / [`TestConfig`]: process-wide and per-class settings

pub mod class_name;
pub mod config;
pub mod manifest;
pub mod method;

pub use class_name::ClassName;
pub use config::{ConfigError, ConfigResult, HarnessConfig, ShadowBinding, TestConfig};
pub use manifest::ManifestDescriptor;
pub use method::TestMethod;
