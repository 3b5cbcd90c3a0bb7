#![deny(unsafe_code)]
//! # shadowbox-environment
//!
//! Simulated runtime environment for Shadowbox
//!
//! Every test class runs inside its own [`SdkEnvironment`]: an arena that owns
//! the class-loading decisions, shadow bindings, static state and application
//! object for that class, and releases all of it on [`SdkEnvironment::clear`].
//!
//! # Components
//!
//! - [`InstantiationPolicy`]: decides which classes are loaded inside the
//!   environment; [`DefaultPolicy`] plus the delegating [`ExemptingPolicy`]
//!   and [`InterceptingPolicy`]
//! - [`ManifestResolver`] / [`FsManifestResolver`]: locate the manifest for a
//!   test subject; a missing manifest is not an error
//! - [`ShadowTable`] / [`ShadowTableCache`]: immutable shadow mappings,
//!   memoised across classes
//! - [`HostStatics`]: the only state shared across environments, reserved
//!   for classes the policy exempts

pub mod application;
pub mod environment;
pub mod error;
pub mod policy;
pub mod resolver;
pub mod shadow_table;
pub mod statics;

pub use application::{Application, ApplicationError, DefaultApplication};
pub use environment::{ClassOrigin, EnvironmentId, EnvironmentState, LoadedClass, SdkEnvironment};
pub use error::{EnvironmentError, EnvironmentResult};
pub use policy::{
    DefaultPolicy, ExemptingPolicy, InstantiationPolicy, InterceptingPolicy, PolicyExt,
};
pub use resolver::{validate_manifest, FsManifestResolver, ManifestResolver};
pub use shadow_table::{CacheStats, ShadowTable, ShadowTableCache};
pub use statics::{HostStatics, StaticSlot};
