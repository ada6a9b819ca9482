//! # Element contract
//!
//! An element is one named piece of an application (a model, a view, a
//! controller). It is built from a [`Scope`] and talks to the rest of the
//! application only through that scope's bus.
//!
//! Path dispatch (`registry.call("cart.add", args)`) ends in
//! [`Element::call`]. Each implementation matches its own closed set of method
//! names; anything else is [`CallError::UnknownMethod`].
//!
//! ## Example
//! ```rust
//! use serde_json::{json, Value};
//! use nsbus::{CallError, Element, Scope};
//!
//! struct Counter { scope: Scope }
//!
//! impl Element for Counter {
//!     fn scope(&self) -> &Scope { &self.scope }
//!
//!     fn call(&self, method: &str, args: &Value) -> Result<Value, CallError> {
//!         match method {
//!             "bump" => {
//!                 self.scope.publish("bumped", args.clone());
//!                 Ok(Value::Null)
//!             }
//!             _ => Err(self.unknown_method(method)),
//!         }
//!     }
//! }
//! ```

use serde_json::Value;

use crate::error::CallError;

use super::Scope;

/// Contract for registrable application pieces.
pub trait Element: Send + Sync + 'static {
    /// The scope the element was built from.
    fn scope(&self) -> &Scope;

    /// Element id (the scope's id).
    fn id(&self) -> &str {
        self.scope().id()
    }

    /// Invokes a named method.
    ///
    /// The default exposes no methods.
    fn call(&self, method: &str, args: &Value) -> Result<Value, CallError> {
        let _ = args;
        Err(self.unknown_method(method))
    }

    /// Called by the registry before the element's subscriptions are released.
    fn on_destroy(&self) {}

    /// Error for a method this element does not expose.
    fn unknown_method(&self, method: &str) -> CallError {
        CallError::UnknownMethod {
            id: self.id().to_string(),
            method: method.to_string(),
        }
    }
}
