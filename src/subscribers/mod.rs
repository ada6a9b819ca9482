//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and helpers for handling events
//! dispatched by the [`Bus`](crate::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   caller ── publish("a.b.c", payload) ──► Bus ──► walk tree: a → a.b → a.b.c
//!                                                     │
//!                                                     ├──► Subscribe::on_event(&Event)   (subs on "a")
//!                                                     ├──► Subscribe::on_event(&Event)   (subs on "a.b")
//!                                                     └──► Subscribe::on_event(&Event)   (subs on "a.b.c")
//! ```
//!
//! ## Subscriber types
//! - **Typed subscribers** - structs implementing [`Subscribe`] (their fields are the scope)
//! - **Closures** - wrapped with [`FnSubscriber`] / [`subscriber_fn`]
//! - **Printer** - [`LogWriter`] (feature `logging`)

#[cfg(feature = "logging")]
mod log;
mod subscribe;
mod subscriber_fn;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_fn::{subscriber_fn, FnSubscriber};
