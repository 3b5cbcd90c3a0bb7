//! Shadow tables
//!
//! A [`ShadowTable`] maps real platform classes to their substitutes for one
//! environment. Tables are immutable once built, which is what lets
//! [`ShadowTableCache`] hand the same table to many test classes without
//! carrying any per-class state between them.

use crate::error::{EnvironmentError, EnvironmentResult};
use parking_lot::Mutex;
use shadowbox_types::{ClassName, ShadowBinding};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Immutable mapping of real class to shadow class.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShadowTable {
    bindings: BTreeMap<ClassName, ClassName>,
}

impl ShadowTable {
    /// Build from default bindings and per-class overrides.
    ///
    /// Within one layer a class may be bound once (repeats of the same
    /// binding are tolerated); an override replaces the default binding for
    /// the same real class.
    pub fn build(defaults: &[ShadowBinding], overrides: &[ShadowBinding]) -> EnvironmentResult<Self> {
        let mut bindings = Self::layer(defaults)?;
        bindings.extend(Self::layer(overrides)?);
        Ok(Self { bindings })
    }

    fn layer(bindings: &[ShadowBinding]) -> EnvironmentResult<BTreeMap<ClassName, ClassName>> {
        let mut layer: BTreeMap<ClassName, ClassName> = BTreeMap::new();
        for binding in bindings {
            match layer.get(&binding.real) {
                Some(existing) if existing != &binding.shadow => {
                    return Err(EnvironmentError::ConflictingShadow {
                        class: binding.real.clone(),
                        existing: existing.clone(),
                        requested: binding.shadow.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    layer.insert(binding.real.clone(), binding.shadow.clone());
                }
            }
        }
        Ok(layer)
    }

    pub fn shadow_for(&self, real: &ClassName) -> Option<&ClassName> {
        self.bindings.get(real)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ClassName, &ClassName)> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Hit/miss counters of a [`ShadowTableCache`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

type CacheKey = (Vec<ShadowBinding>, Vec<ShadowBinding>);

#[derive(Debug, Default)]
struct CacheInner {
    tables: HashMap<CacheKey, Arc<ShadowTable>>,
    stats: CacheStats,
}

/// Process-wide memo of built shadow tables, shared by explicit handle.
#[derive(Clone, Debug, Default)]
pub struct ShadowTableCache {
    inner: Arc<Mutex<CacheInner>>,
}

impl ShadowTableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the table for these inputs, building it on first request.
    /// Build failures are not cached.
    pub fn get_or_build(
        &self,
        defaults: &[ShadowBinding],
        overrides: &[ShadowBinding],
    ) -> EnvironmentResult<Arc<ShadowTable>> {
        let key = (defaults.to_vec(), overrides.to_vec());
        let mut inner = self.inner.lock();
        if let Some(table) = inner.tables.get(&key) {
            let table = Arc::clone(table);
            inner.stats.hits += 1;
            tracing::debug!(bindings = table.len(), "Shadow table cache hit");
            return Ok(table);
        }

        let table = Arc::new(ShadowTable::build(defaults, overrides)?);
        inner.stats.misses += 1;
        inner.tables.insert(key, Arc::clone(&table));
        tracing::debug!(bindings = table.len(), "Shadow table built");
        Ok(table)
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats
    }

    pub fn len(&self) -> usize {
        self.inner.lock().tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every memoised table.
    pub fn purge(&self) {
        let mut inner = self.inner.lock();
        inner.tables.clear();
        inner.stats = CacheStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(real: &str, shadow: &str) -> ShadowBinding {
        ShadowBinding::new(real, shadow)
    }

    #[test]
    fn overrides_replace_defaults() {
        let table = ShadowTable::build(
            &[bind("android.view.View", "d.ShadowView"), bind("android.os.Looper", "d.ShadowLooper")],
            &[bind("android.view.View", "o.ShadowView")],
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.shadow_for(&ClassName::new("android.view.View")).map(ClassName::as_str),
            Some("o.ShadowView")
        );
        assert_eq!(
            table.shadow_for(&ClassName::new("android.os.Looper")).map(ClassName::as_str),
            Some("d.ShadowLooper")
        );
    }

    #[test]
    fn conflict_within_a_layer_is_rejected() {
        let err = ShadowTable::build(
            &[],
            &[bind("android.view.View", "a.Shadow"), bind("android.view.View", "b.Shadow")],
        )
        .unwrap_err();
        assert!(matches!(err, EnvironmentError::ConflictingShadow { .. }));
    }

    #[test]
    fn repeated_identical_binding_is_fine() {
        let table = ShadowTable::build(
            &[bind("android.view.View", "a.Shadow"), bind("android.view.View", "a.Shadow")],
            &[],
        )
        .unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn cache_reuses_tables() {
        let cache = ShadowTableCache::new();
        let defaults = vec![bind("android.view.View", "a.Shadow")];

        let first = cache.get_or_build(&defaults, &[]).unwrap();
        let second = cache.get_or_build(&defaults, &[]).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });

        let other = cache
            .get_or_build(&defaults, &[bind("android.os.Looper", "a.ShadowLooper")])
            .unwrap();
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn cache_does_not_store_failures() {
        let cache = ShadowTableCache::new();
        let bad = vec![bind("x.A", "s.One"), bind("x.A", "s.Two")];
        assert!(cache.get_or_build(&bad, &[]).is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 0);
    }

    #[test]
    fn clones_share_storage() {
        let cache = ShadowTableCache::new();
        let clone = cache.clone();
        clone.get_or_build(&[], &[]).unwrap();
        assert_eq!(cache.len(), 1);
        cache.purge();
        assert!(clone.is_empty());
    }
}
