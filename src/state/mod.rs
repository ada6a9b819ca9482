//! # Reactive state store.
//!
//! [`StateStore`] keeps a flat `String → serde_json::Value` map and announces
//! every mutation on one [`Bus`](crate::Bus).
//!
//! ```text
//! set("count", 1) ──► map["count"] = 1 ──► publish("state.changed", {key, value, previous?})
//! reset()         ──► map = {}         ──► publish("state.reset", {})
//! ```
//!
//! Subscribing to `"state"` receives both kinds, thanks to namespace bubbling.

mod change;
mod store;

pub use change::StateChange;
pub use store::StateStore;

/// Context published after every [`StateStore::set`].
pub const STATE_CHANGED: &str = "state.changed";

/// Context published after [`StateStore::reset`].
pub const STATE_RESET: &str = "state.reset";
