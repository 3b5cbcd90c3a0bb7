//! The per-class simulated environment
//!
//! [`SdkEnvironment`] is an arena: everything a test class creates inside
//! it (class-loading decisions, static state, the application object) is
//! owned by it and released by [`SdkEnvironment::clear`]. Only classes the
//! policy exempts reach outside, through [`HostStatics`].
//!
//! Lifecycle: `Created` → `configure` → `Configured` → `clear` → `Cleared`.
//! `clear` is accepted from any state and is idempotent.

use crate::application::Application;
use crate::error::{EnvironmentError, EnvironmentResult};
use crate::policy::InstantiationPolicy;
use crate::resolver::validate_manifest;
use crate::shadow_table::{ShadowTable, ShadowTableCache};
use crate::statics::{downcast_slot, HostStatics, StaticSlot};
use serde::{Deserialize, Serialize};
use shadowbox_types::{ClassName, ManifestDescriptor, ShadowBinding, TestConfig};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier of one environment instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvironmentId(Uuid);

impl EnvironmentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EnvironmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "env-{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvironmentState {
    Created,
    Configured,
    Cleared,
}

/// Where a class was loaded from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassOrigin {
    /// Loaded inside the environment, through its shadow if one is bound
    Environment { shadow: Option<ClassName> },
    /// Taken from the host unmodified
    Host,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedClass {
    pub name: ClassName,
    pub origin: ClassOrigin,
}

impl LoadedClass {
    pub fn is_intercepted(&self) -> bool {
        matches!(self.origin, ClassOrigin::Environment { .. })
    }

    pub fn shadow(&self) -> Option<&ClassName> {
        match &self.origin {
            ClassOrigin::Environment { shadow } => shadow.as_ref(),
            ClassOrigin::Host => None,
        }
    }
}

/// Isolated execution context for one test class.
pub struct SdkEnvironment {
    id: EnvironmentId,
    state: EnvironmentState,
    manifest: Option<ManifestDescriptor>,
    policy: Option<Arc<dyn InstantiationPolicy>>,
    default_shadows: Vec<ShadowBinding>,
    shadow_cache: ShadowTableCache,
    host: HostStatics,
    // Per-class state, released by `clear`
    shadows: Option<Arc<ShadowTable>>,
    loaded: BTreeMap<ClassName, ClassOrigin>,
    statics: HashMap<ClassName, StaticSlot>,
    application: Option<Box<dyn Application>>,
}

impl SdkEnvironment {
    /// Create an environment with its own host statics and shadow cache.
    pub fn new(manifest: Option<ManifestDescriptor>, policy: Arc<dyn InstantiationPolicy>) -> Self {
        Self {
            id: EnvironmentId::generate(),
            state: EnvironmentState::Created,
            manifest,
            policy: Some(policy),
            default_shadows: Vec::new(),
            shadow_cache: ShadowTableCache::new(),
            host: HostStatics::new(),
            shadows: None,
            loaded: BTreeMap::new(),
            statics: HashMap::new(),
            application: None,
        }
    }

    /// Share host statics with other environments.
    pub fn with_host_statics(mut self, host: HostStatics) -> Self {
        self.host = host;
        self
    }

    /// Share a shadow table cache with other environments.
    pub fn with_shadow_cache(mut self, cache: ShadowTableCache) -> Self {
        self.shadow_cache = cache;
        self
    }

    /// Bindings applied before the per-class ones.
    pub fn with_default_shadows(mut self, shadows: Vec<ShadowBinding>) -> Self {
        self.default_shadows = shadows;
        self
    }

    // ── Configuration ────────────────────────────────────────────────

    /// One-time setup: validates the manifest and fixes the shadow mapping.
    ///
    /// Every bound real class must be one the policy intercepts, otherwise
    /// the shadow could never take effect.
    pub fn configure(&mut self, config: &TestConfig) -> EnvironmentResult<()> {
        match self.state {
            EnvironmentState::Created => {}
            EnvironmentState::Configured => return Err(EnvironmentError::AlreadyConfigured),
            EnvironmentState::Cleared => return Err(EnvironmentError::Cleared),
        }

        if let Some(manifest) = &self.manifest {
            validate_manifest(manifest)?;
        }

        let policy = self.policy()?;
        let table = self
            .shadow_cache
            .get_or_build(&self.default_shadows, &config.shadows)?;
        if let Some((real, shadow)) = table.iter().find(|(real, _)| !policy.should_intercept(real)) {
            return Err(EnvironmentError::ShadowNotIntercepted {
                class: real.clone(),
                shadow: shadow.clone(),
            });
        }

        tracing::info!(
            environment = %self.id,
            shadows = table.len(),
            manifest = self.manifest.is_some(),
            "Environment configured"
        );
        self.shadows = Some(table);
        self.state = EnvironmentState::Configured;
        Ok(())
    }

    fn policy(&self) -> EnvironmentResult<&Arc<dyn InstantiationPolicy>> {
        self.policy.as_ref().ok_or(EnvironmentError::Cleared)
    }

    fn ensure_configured(&self) -> EnvironmentResult<()> {
        match self.state {
            EnvironmentState::Configured => Ok(()),
            EnvironmentState::Created => Err(EnvironmentError::NotConfigured),
            EnvironmentState::Cleared => Err(EnvironmentError::Cleared),
        }
    }

    // ── Class loading ────────────────────────────────────────────────

    /// Whether the policy of this environment intercepts `class`.
    pub fn should_intercept(&self, class: &ClassName) -> EnvironmentResult<bool> {
        Ok(self.policy()?.should_intercept(class))
    }

    /// Load `class`, deciding its origin once per environment.
    pub fn load_class(&mut self, class: &ClassName) -> EnvironmentResult<LoadedClass> {
        self.ensure_configured()?;
        if let Some(origin) = self.loaded.get(class) {
            return Ok(LoadedClass {
                name: class.clone(),
                origin: origin.clone(),
            });
        }

        let origin = if self.policy()?.should_intercept(class) {
            ClassOrigin::Environment {
                shadow: self
                    .shadows
                    .as_ref()
                    .and_then(|table| table.shadow_for(class))
                    .cloned(),
            }
        } else {
            ClassOrigin::Host
        };
        tracing::debug!(environment = %self.id, class = %class, origin = ?origin, "Class loaded");
        self.loaded.insert(class.clone(), origin.clone());
        Ok(LoadedClass {
            name: class.clone(),
            origin,
        })
    }

    /// Classes loaded so far, in name order.
    pub fn loaded_classes(&self) -> Vec<LoadedClass> {
        self.loaded
            .iter()
            .map(|(name, origin)| LoadedClass {
                name: name.clone(),
                origin: origin.clone(),
            })
            .collect()
    }

    /// Static state of `class`, initialised with `init` on first access.
    ///
    /// Intercepted classes get a slot owned by this environment; exempted
    /// classes share the host slot.
    pub fn static_state<T, F>(&mut self, class: &ClassName, init: F) -> EnvironmentResult<Arc<T>>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let loaded = self.load_class(class)?;
        match loaded.origin {
            ClassOrigin::Host => self.host.get_or_init(class, init),
            ClassOrigin::Environment { .. } => {
                let slot = self
                    .statics
                    .entry(class.clone())
                    .or_insert_with(|| Arc::new(init()) as StaticSlot);
                downcast_slot(class, Arc::clone(slot))
            }
        }
    }

    // ── Application ──────────────────────────────────────────────────

    pub fn set_application(&mut self, application: Box<dyn Application>) -> EnvironmentResult<()> {
        self.ensure_configured()?;
        self.application = Some(application);
        Ok(())
    }

    pub fn has_application(&self) -> bool {
        self.application.is_some()
    }

    pub fn application_mut(&mut self) -> Option<&mut (dyn Application + 'static)> {
        self.application.as_deref_mut()
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn id(&self) -> EnvironmentId {
        self.id
    }

    pub fn state(&self) -> EnvironmentState {
        self.state
    }

    pub fn is_configured(&self) -> bool {
        self.state == EnvironmentState::Configured
    }

    pub fn manifest(&self) -> Option<&ManifestDescriptor> {
        self.manifest.as_ref()
    }

    pub fn shadow_table(&self) -> Option<&ShadowTable> {
        self.shadows.as_deref()
    }

    pub fn host_statics(&self) -> &HostStatics {
        &self.host
    }

    // ── Teardown ─────────────────────────────────────────────────────

    /// Release all per-class state.
    ///
    /// Each part is detached before it is dropped, so if a user `Drop`
    /// panics the remaining parts are still released by calling `clear`
    /// again. Calling it on a cleared environment does nothing.
    pub fn clear(&mut self) {
        let was_cleared = self.state == EnvironmentState::Cleared && self.all_state_is_cleared();
        self.state = EnvironmentState::Cleared;

        drop(self.application.take());
        drop(std::mem::take(&mut self.statics));
        drop(std::mem::take(&mut self.loaded));
        self.shadows = None;
        self.policy = None;
        self.manifest = None;
        self.default_shadows = Vec::new();

        if !was_cleared {
            tracing::info!(environment = %self.id, "Environment cleared");
        }
    }

    /// True once no per-class state remains reachable from this environment.
    pub fn all_state_is_cleared(&self) -> bool {
        self.application.is_none()
            && self.statics.is_empty()
            && self.loaded.is_empty()
            && self.shadows.is_none()
            && self.policy.is_none()
            && self.manifest.is_none()
            && self.default_shadows.is_empty()
    }
}

impl fmt::Debug for SdkEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkEnvironment")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("manifest", &self.manifest)
            .field("shadows", &self.shadows.as_ref().map(|t| t.len()))
            .field("loaded", &self.loaded.len())
            .field("statics", &self.statics.len())
            .field("application", &self.application.is_some())
            .finish()
    }
}
