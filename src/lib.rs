//! # nsbus
//!
//! **nsbus** is an in-process, hierarchical publish/subscribe bus with an
//! attached reactive key-value store.
//!
//! Independently registered pieces of an application (models, views,
//! controllers) talk through dot-separated namespaces instead of holding
//! references to each other. A subscriber on a short namespace receives every
//! event published under any deeper namespace that starts with it, as long as
//! every intermediate segment is a known registration point.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   subscribe("a", S1)      subscribe("a.b", S2)      subscribe("a.b", S3, once)
//!          │                        │                          │
//!          ▼                        ▼                          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Bus                                                              │
//! │  - SubscriptionTree (nodes per segment, ordered subscriber lists) │
//! │  - token index (token → path, removal by token)                   │
//! │  - event log (seq, time, context, payload)                        │
//! │  - deferred queue (publish_async, FIFO worker)                    │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                │ publish("a.b.c", p)
//!                                ▼
//!              root ─► a: S1.on_event ─► a.b: S2, S3.on_event ─► a.b.c: (none)
//!                                              └─ S3 removed (fire-once)
//!
//!   StateStore::set(k, v) ──► map[k] = v ──► Bus::publish("state.changed", {key, value, previous})
//! ```
//!
//! ### Dispatch
//! ```text
//! publish(context, payload)
//!   ├─► append Event{seq, at, context, payload} to the log
//!   ├─► for each segment of context, from the root:
//!   │       ├─ no child for segment ─► stop
//!   │       ├─ snapshot node's subscriber list (lock released)
//!   │       ├─ call on_event() on each live subscriber, registration order
//!   │       └─ remove the fire-once subscribers just called
//!   └─► return &Bus (chaining)
//! ```
//!
//! ## Features
//! | Area              | Description                                                        | Key types                               |
//! |-------------------|--------------------------------------------------------------------|-----------------------------------------|
//! | **Bus**           | Sync and deferred publish, prefix bubbling, event log, teardown.    | [`Bus`], [`Event`], [`PendingPublish`]  |
//! | **Subscriptions** | Register / unregister by token / lookup, fire-once semantics.      | [`Token`], [`SubscriptionTree`]         |
//! | **Subscribers**   | Trait objects or closures.                                         | [`Subscribe`], [`FnSubscriber`]         |
//! | **State**         | Key-value store publishing `state.changed` / `state.reset`.        | [`StateStore`], [`StateChange`]         |
//! | **Composition**   | Named elements on per-layer buses, path dispatch.                  | [`Application`], [`Registry`], [`Scope`]|
//! | **Errors**        | Typed errors for deferred delivery and path dispatch.              | [`BusError`], [`CallError`]             |
//! | **Configuration** | Event-log settings.                                                | [`Config`]                              |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Logging
//! The crate reports through [`tracing`]: `debug` for registration, removal and
//! teardown, `warn` for composition-layer misuse, `error` for panicking
//! subscribers. It never installs a global subscriber.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use serde_json::json;
//! use nsbus::{subscriber_fn, Bus, Config, Payload, StateChange, StateStore};
//!
//! let bus = Bus::new(Config::default());
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! // "user" sees everything under user.*
//! let s = seen.clone();
//! let token = bus.subscribe("user", subscriber_fn(move |ev| {
//!     s.lock().unwrap().push(ev.context.to_string());
//! }));
//!
//! bus.publish("user.login", json!({ "name": "ada" }))
//!    .publish("user.logout", Payload::default());
//! assert_eq!(*seen.lock().unwrap(), ["user.login", "user.logout"]);
//!
//! assert!(bus.unsubscribe(token));
//! assert!(!bus.unsubscribe(token));
//!
//! // Reactive state on the same bus.
//! let store = StateStore::new(bus.clone());
//! let changes = Arc::new(Mutex::new(Vec::new()));
//! let c = changes.clone();
//! bus.subscribe("state.changed", subscriber_fn(move |ev| {
//!     c.lock().unwrap().extend(StateChange::from_event(ev));
//! }));
//!
//! store.set("count", 1);
//! assert_eq!(store.get("count"), Some(json!(1)));
//! assert_eq!(changes.lock().unwrap()[0].previous, None);
//! ```
mod app;
mod config;
mod error;
mod events;
mod state;
mod subscribers;
mod tree;

// ---- Public re-exports ----

pub use app::{Application, ApplicationBuilder, Element, Layer, Registry, Scope};
pub use config::Config;
pub use error::{BusError, CallError};
pub use events::{segments, Bus, Event, Payload, PendingPublish};
pub use state::{StateChange, StateStore, STATE_CHANGED, STATE_RESET};
pub use subscribers::{subscriber_fn, FnSubscriber, Subscribe};
pub use tree::{
    Node, ParseTokenError, Subscription, SubscriptionInfo, SubscriptionTree, Token,
};

// Optional: expose a simple built-in printer subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
