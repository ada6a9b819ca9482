//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for reacting to published events. A
//! subscriber is registered on a namespace with
//! [`Bus::subscribe`](crate::Bus::subscribe) and is called synchronously, on
//! the publisher's stack, for every event published under that namespace.
//!
//! ## Contract
//! - `on_event` runs inline in `publish`; keep it short. Hand long work to a
//!   task of your own.
//! - Re-entrant calls are allowed: a subscriber may publish, subscribe or
//!   unsubscribe on the same bus from inside `on_event`.
//! - A panic is caught and logged; the remaining subscribers still run.
//!
//! ## Example
//! ```rust
//! use nsbus::{Event, Subscribe};
//!
//! struct Audit;
//!
//! impl Subscribe for Audit {
//!     fn on_event(&self, ev: &Event) {
//!         let _ = (&ev.context, &ev.payload);
//!     }
//!     fn name(&self) -> &str { "audit" }
//! }
//! ```

use crate::events::Event;

/// Contract for event subscribers.
///
/// The implementing value plays the role of the callback's receiver: whatever
/// state it owns is what the callback sees.
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event.
    ///
    /// # Parameters
    /// - `event`: the published event; its `context` is the full published
    ///   namespace, which may be deeper than the one this subscriber registered on.
    fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
