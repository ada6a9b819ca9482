//! # Published events and their log entries.
//!
//! Every call to [`Bus::publish`](crate::Bus::publish) produces exactly one [`Event`].
//! The same value is appended to the bus log and handed by reference to each
//! matching subscriber, so the payload is never cloned on the way through.
//!
//! ## Ordering guarantees
//! Each event carries a per-bus sequence number (`seq`) that increases
//! monotonically in publish order. Use `seq` to correlate log entries with what
//! subscribers observed.
//!
//! ## Example
//! ```rust
//! use nsbus::{Event, Payload};
//! use serde_json::json;
//!
//! let ev = Event::new(7, "user.login", Payload::new(json!({ "name": "ada" })));
//!
//! assert_eq!(ev.seq, 7);
//! assert_eq!(&*ev.context, "user.login");
//! assert_eq!(ev.payload["name"], "ada");
//! ```

use std::ops::Deref;
use std::sync::Arc;
use std::time::SystemTime;

use serde_json::Value;

/// Shared, immutable event payload.
///
/// Cloning a `Payload` clones the `Arc`, not the JSON value.
#[derive(Clone, Debug, PartialEq)]
pub struct Payload(Arc<Value>);

impl Payload {
    /// Wraps a JSON value.
    pub fn new(value: Value) -> Self {
        Self(Arc::new(value))
    }

    /// An empty JSON object (`{}`).
    pub fn empty() -> Self {
        Self::new(Value::Object(serde_json::Map::new()))
    }

    /// Borrow the inner JSON value.
    #[inline]
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// True when both payloads point at the same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &Payload) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::new(Value::Null)
    }
}

impl Deref for Payload {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// One published event (also the bus log entry).
///
/// - `seq`: monotonic per-bus sequence for ordering
/// - `at`: wall-clock timestamp taken when the publish started
/// - `context`: full namespace string as given to `publish`
/// - `payload`: shared payload
#[derive(Clone, Debug)]
pub struct Event {
    /// Per-bus, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Full context the event was published under.
    pub context: Arc<str>,
    /// Event payload.
    pub payload: Payload,
}

impl Event {
    /// Creates an event stamped with the current time.
    pub fn new(seq: u64, context: impl Into<Arc<str>>, payload: Payload) -> Self {
        Self {
            seq,
            at: SystemTime::now(),
            context: context.into(),
            payload,
        }
    }

    /// Overrides the timestamp.
    #[inline]
    pub fn with_time(mut self, at: SystemTime) -> Self {
        self.at = at;
        self
    }

    /// Iterates over the non-empty segments of this event's context.
    #[inline]
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        super::segments(&self.context)
    }

    /// True if `prefix` names this context or one of its ancestors.
    ///
    /// Comparison is segment-wise, so `"a.b"` is a prefix of `"a.b.c"` but not of `"a.bc"`.
    pub fn is_under(&self, prefix: &str) -> bool {
        let mut own = self.segments();
        super::segments(prefix).all(|seg| own.next() == Some(seg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_clone_shares_allocation() {
        let p = Payload::new(json!({ "n": 1 }));
        let q = p.clone();
        assert!(p.ptr_eq(&q));
        assert!(!p.ptr_eq(&Payload::new(json!({ "n": 1 }))));
    }

    #[test]
    fn empty_payload_is_empty_object() {
        assert_eq!(Payload::empty().value(), &json!({}));
        assert_eq!(Payload::default().value(), &Value::Null);
    }

    #[test]
    fn is_under_is_segment_wise() {
        let ev = Event::new(0, "a.b.c", Payload::default());
        assert!(ev.is_under("a"));
        assert!(ev.is_under("a.b"));
        assert!(ev.is_under("a..b."));
        assert!(ev.is_under("a.b.c"));
        assert!(!ev.is_under("a.bc"));
        assert!(!ev.is_under("a.b.c.d"));
    }
}
