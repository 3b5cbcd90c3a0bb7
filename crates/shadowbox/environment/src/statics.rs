//! Static state slots
//!
//! Classes loaded inside an environment keep their static state in that
//! environment, so it disappears with it. Classes the policy exempts resolve
//! to [`HostStatics`] instead: one store shared by every environment that was
//! handed the same handle.

use crate::error::{EnvironmentError, EnvironmentResult};
use parking_lot::Mutex;
use shadowbox_types::ClassName;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Type-erased static state of one class.
pub type StaticSlot = Arc<dyn Any + Send + Sync>;

pub(crate) fn downcast_slot<T: Any + Send + Sync>(
    class: &ClassName,
    slot: StaticSlot,
) -> EnvironmentResult<Arc<T>> {
    slot.downcast::<T>()
        .map_err(|_| EnvironmentError::StaticTypeMismatch(class.clone()))
}

/// Host-side static state, shared across environments by explicit handle.
#[derive(Clone, Default)]
pub struct HostStatics {
    slots: Arc<Mutex<HashMap<ClassName, StaticSlot>>>,
}

impl HostStatics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Static state of `class`, initialised with `init` on first access.
    ///
    /// `init` runs without the lock held, so it may touch other host
    /// statics. If two callers race, the first value stored wins.
    pub fn get_or_init<T, F>(&self, class: &ClassName, init: F) -> EnvironmentResult<Arc<T>>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let existing = self.slots.lock().get(class).cloned();
        let slot = match existing {
            Some(slot) => slot,
            None => {
                let fresh = Arc::new(init()) as StaticSlot;
                let mut slots = self.slots.lock();
                Arc::clone(slots.entry(class.clone()).or_insert(fresh))
            }
        };
        downcast_slot(class, slot)
    }

    /// Install `value` as the static state of `class`, replacing any previous value.
    pub fn install<T: Any + Send + Sync>(&self, class: &ClassName, value: Arc<T>) {
        self.slots.lock().insert(class.clone(), value);
    }

    pub fn get<T: Any + Send + Sync>(&self, class: &ClassName) -> EnvironmentResult<Option<Arc<T>>> {
        let slot = self.slots.lock().get(class).cloned();
        slot.map(|slot| downcast_slot(class, slot)).transpose()
    }

    pub fn contains(&self, class: &ClassName) -> bool {
        self.slots.lock().contains_key(class)
    }

    /// Forget the state of `class`; returns whether it existed.
    pub fn reset(&self, class: &ClassName) -> bool {
        self.slots.lock().remove(class).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for HostStatics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.slots.lock();
        let mut classes: Vec<_> = slots.keys().map(ClassName::as_str).collect();
        classes.sort_unstable();
        f.debug_struct("HostStatics").field("classes", &classes).finish()
    }
}
