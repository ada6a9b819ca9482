use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use tracing::debug;

use crate::events::{Bus, Payload};

use super::{StateChange, STATE_CHANGED, STATE_RESET};

/// Flat key-value map whose every mutation is published on a [`Bus`].
///
/// ### Rules
/// - `set` writes first, then publishes [`STATE_CHANGED`] synchronously, so a
///   subscriber that reads the store sees the new value.
/// - `reset` empties the map, then publishes [`STATE_RESET`] with `{}`.
/// - Reads return copies; nothing handed out aliases the internal map.
/// - The map lock is never held while subscribers run.
///
/// Cloning a `StateStore` yields another handle to the same map.
#[derive(Clone, Debug)]
pub struct StateStore {
    bus: Bus,
    entries: Arc<RwLock<HashMap<String, Value>>>,
}

impl StateStore {
    /// Creates an empty store publishing on `bus`.
    pub fn new(bus: Bus) -> Self {
        Self {
            bus,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The bus change events are published on.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Shallow, independent copy of the whole map.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.read().clone()
    }

    /// Value at `key`; `None` if the key was never set (or was reset).
    ///
    /// A stored `null` comes back as `Some(Value::Null)`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Stores `value` at `key` and publishes the change.
    ///
    /// Returns the previous value, if any.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        let previous = self.write().insert(key.clone(), value.clone());

        debug!(key = %key, replaced = previous.is_some(), "state set");
        let change = StateChange {
            key,
            value,
            previous: previous.clone(),
        };
        self.bus.publish(STATE_CHANGED, Payload::new(change.to_value()));
        previous
    }

    /// Empties the map and publishes a reset with an empty payload.
    pub fn reset(&self) {
        let dropped = std::mem::take(&mut *self.write()).len();
        debug!(dropped, "state reset");
        self.bus.publish(STATE_RESET, Payload::empty());
    }

    /// Empties the map without publishing (used on teardown).
    pub(crate) fn discard(&self) {
        self.write().clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Value>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Value>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
