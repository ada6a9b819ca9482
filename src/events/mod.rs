//! Events: data model and the bus that dispatches them.
//!
//! This module groups the event **data model** shared by the bus, the
//! subscription tree and the state store, and the **bus** itself.
//!
//! ## Contents
//! - [`Payload`] shared JSON payload
//! - [`Event`] one published event; also the bus log entry
//! - [`Bus`] namespace-aware publish/subscribe with an event log
//! - [`PendingPublish`] completion handle of a deferred publish
//! - [`segments`] splits a dotted context into its non-empty segments
//!
//! ## Namespaces
//! ```text
//! "user..model.login."  ──►  ["user", "model", "login"]
//! ```
//! Leading, trailing and repeated dots never produce a segment, so they can
//! never create a tree node with an empty key.

mod bus;
mod dispatcher;
mod event;

pub use bus::Bus;
pub use dispatcher::PendingPublish;
pub use event::{Event, Payload};

/// Splits a dotted context into its non-empty segments, in order.
///
/// Registration and publish both go through this function, so both sides
/// agree on what a namespace path is.
///
/// ```rust
/// let segs: Vec<&str> = nsbus::segments(".a..b.c.").collect();
/// assert_eq!(segs, ["a", "b", "c"]);
/// ```
pub fn segments(context: &str) -> impl Iterator<Item = &str> {
    context.split('.').filter(|s| !s.is_empty())
}

/// Joins a scope id and a context as `id.context`.
pub(crate) fn scoped(id: &str, context: &str) -> String {
    format!("{id}.{context}")
}
