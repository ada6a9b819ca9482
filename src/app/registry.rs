//! # Element registry - named elements on one bus.
//!
//! Registry creates, looks up, dispatches to and destroys elements by id:
//! - `create(id, build)` → builds the element from a fresh [`Scope`] and stores it
//! - `call("id.method", args)` → resolves the element and invokes [`Element::call`]
//! - `destroy(id)` → `on_destroy()`, then releases every subscription of its scope
//!
//! ## Architecture
//! ```text
//! Registry("models", bus)
//!   ├─► create("cart", build)  → build(Scope{"cart", bus}) → elements["cart"]
//!   ├─► call("cart.add", args) → elements["cart"].call("add", args)
//!   └─► destroy("cart")        → on_destroy() → scope.release()
//! ```
//!
//! ## Rules
//! - Registry owns the elements; callers receive shared handles.
//! - Duplicate ids are not an error: a warning is logged and the existing
//!   element is returned.
//! - Misuse of `call` (bad path, unknown id, unknown method) is logged as a
//!   warning and returned as [`CallError`]; it never panics.
//! - No lock is held while element code runs (`build`, `call`, `on_destroy`).

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CallError;
use crate::events::Bus;

use super::{Element, Scope};

/// Named elements sharing one bus.
pub struct Registry {
    kind: &'static str,
    bus: Bus,
    elements: RwLock<HashMap<String, Arc<dyn Element>>>,
}

impl Registry {
    /// Creates an empty registry; `kind` only labels log lines.
    pub fn new(kind: &'static str, bus: Bus) -> Self {
        Self {
            kind,
            bus,
            elements: RwLock::new(HashMap::new()),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Builds and registers an element under `id`.
    ///
    /// If `id` is taken, logs a warning and returns the existing element;
    /// `build` is not called in that case.
    pub fn create<E, F>(&self, id: &str, build: F) -> Arc<dyn Element>
    where
        E: Element,
        F: FnOnce(Scope) -> E,
    {
        if let Some(existing) = self.get(id) {
            warn!(kind = self.kind, id, "element already registered; returning existing");
            return existing;
        }

        let scope = Scope::new(id, self.bus.clone());
        let element: Arc<dyn Element> = Arc::new(build(scope.clone()));

        let mut elements = self.write();
        if let Some(existing) = elements.get(id) {
            let existing = Arc::clone(existing);
            drop(elements);
            warn!(kind = self.kind, id, "element registered concurrently; discarding new one");
            scope.release();
            return existing;
        }
        elements.insert(id.to_string(), Arc::clone(&element));
        drop(elements);

        debug!(kind = self.kind, id, "element created");
        element
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Element>> {
        self.read().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().contains_key(id)
    }

    /// Returns sorted list of registered ids.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Removes the element, runs its `on_destroy` hook and releases its subscriptions.
    ///
    /// Returns `false` if no element is registered under `id`.
    pub fn destroy(&self, id: &str) -> bool {
        let Some(element) = self.write().remove(id) else {
            return false;
        };
        element.on_destroy();
        let released = element.scope().release();
        debug!(kind = self.kind, id, released, "element destroyed");
        true
    }

    /// Destroys every element.
    pub fn clear(&self) {
        let drained: Vec<(String, Arc<dyn Element>)> = self.write().drain().collect();
        for (id, element) in drained {
            element.on_destroy();
            let released = element.scope().release();
            debug!(kind = self.kind, id = %id, released, "element destroyed");
        }
    }

    /// Dispatches `"elementId.method"` to the element's [`Element::call`].
    ///
    /// The method is the last segment, so ids may themselves contain dots.
    pub fn call(&self, path: &str, args: &Value) -> Result<Value, CallError> {
        let result = self.resolve(path).and_then(|(element, method)| element.call(method, args));
        if let Err(err) = &result {
            warn!(kind = self.kind, path, label = err.as_label(), "{}", err.as_message());
        }
        result
    }

    fn resolve<'p>(&self, path: &'p str) -> Result<(Arc<dyn Element>, &'p str), CallError> {
        let (id, method) = path
            .rsplit_once('.')
            .filter(|(id, method)| !id.is_empty() && !method.is_empty())
            .ok_or_else(|| CallError::MalformedPath {
                path: path.to_string(),
            })?;
        let element = self.get(id).ok_or_else(|| CallError::UnknownElement {
            id: id.to_string(),
        })?;
        Ok((element, method))
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<dyn Element>>> {
        self.elements.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<dyn Element>>> {
        self.elements.write().unwrap_or_else(PoisonError::into_inner)
    }
}
