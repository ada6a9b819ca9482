//! Error types used by the bus and the composition layer.
//!
//! This module defines two error enums:
//!
//! - [`BusError`] — failures of deferred delivery.
//! - [`CallError`] — failures of path dispatch (`"elementId.method"`) through a
//!   [`Registry`](crate::Registry).
//!
//! Not-found conditions in the core (unknown token, unmatched namespace, absent
//! state key) are **not** errors; they surface as `bool` / `Option` results.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.

use thiserror::Error;

/// # Errors produced by the bus.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The bus (and with it the deferred-publish queue) was dropped, or its
    /// runtime shut down, before the deferred publish ran.
    #[error("deferred publish of {context:?} was dropped before it ran")]
    DispatcherClosed {
        /// Context of the publish that never ran.
        context: String,
    },
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use nsbus::BusError;
    ///
    /// let err = BusError::DispatcherClosed { context: "a.b".into() };
    /// assert_eq!(err.as_label(), "bus_dispatcher_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::DispatcherClosed { .. } => "bus_dispatcher_closed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BusError::DispatcherClosed { context } => {
                format!("dispatcher closed; dropped publish context={context}")
            }
        }
    }
}

/// # Errors produced by path dispatch to registered elements.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// The path is not of the form `elementId.method`.
    #[error("malformed call path {path:?}; expected \"elementId.method\"")]
    MalformedPath {
        /// The path as given.
        path: String,
    },

    /// No element is registered under this id.
    #[error("no element registered as {id:?}")]
    UnknownElement {
        /// The element id.
        id: String,
    },

    /// The element does not expose this method.
    #[error("element {id:?} has no method {method:?}")]
    UnknownMethod {
        /// The element id.
        id: String,
        /// The method name.
        method: String,
    },

    /// The method ran and reported a failure.
    #[error("call failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },
}

impl CallError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use nsbus::CallError;
    ///
    /// let err = CallError::UnknownElement { id: "cart".into() };
    /// assert_eq!(err.as_label(), "call_unknown_element");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            CallError::MalformedPath { .. } => "call_malformed_path",
            CallError::UnknownElement { .. } => "call_unknown_element",
            CallError::UnknownMethod { .. } => "call_unknown_method",
            CallError::Failed { .. } => "call_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            CallError::MalformedPath { path } => format!("malformed path: {path}"),
            CallError::UnknownElement { id } => format!("unknown element: {id}"),
            CallError::UnknownMethod { id, method } => format!("unknown method: {id}.{method}"),
            CallError::Failed { error } => format!("error: {error}"),
        }
    }

    /// Shorthand for [`CallError::Failed`].
    pub fn failed(error: impl Into<String>) -> Self {
        CallError::Failed {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_and_messages() {
        let err = CallError::UnknownMethod {
            id: "cart".into(),
            method: "fly".into(),
        };
        assert_eq!(err.as_label(), "call_unknown_method");
        assert_eq!(err.as_message(), "unknown method: cart.fly");
        assert_eq!(err.to_string(), r#"element "cart" has no method "fly""#);

        let err = CallError::failed("boom");
        assert_eq!(err.as_label(), "call_failed");
        assert_eq!(err.to_string(), "call failed: boom");
    }
}
