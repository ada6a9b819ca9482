//! # Function-backed subscriber (`FnSubscriber`)
//!
//! [`FnSubscriber`] wraps a closure `F: Fn(&Event)`, so simple handlers do not
//! need a dedicated type. Shared state goes in an `Arc<...>` captured by the closure.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use nsbus::{Bus, Event, FnSubscriber, Payload};
//!
//! let hits = Arc::new(AtomicUsize::new(0));
//! let h = hits.clone();
//! let bus = Bus::default();
//! bus.subscribe("clicks", FnSubscriber::arc("counter", move |_ev: &Event| {
//!     h.fetch_add(1, Ordering::SeqCst);
//! }));
//!
//! bus.publish("clicks.left", Payload::default());
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::events::Event;

use super::Subscribe;

/// Closure-backed subscriber.
pub struct FnSubscriber<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> FnSubscriber<F> {
    /// Creates a new function-backed subscriber.
    ///
    /// Prefer [`FnSubscriber::arc`] when you immediately need a handle for `subscribe`.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the subscriber and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> fmt::Debug for FnSubscriber<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSubscriber").field("name", &self.name).finish()
    }
}

impl<F> Subscribe for FnSubscriber<F>
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    fn on_event(&self, event: &Event) {
        (self.f)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Shorthand for an anonymous [`FnSubscriber`] behind an `Arc`.
pub fn subscriber_fn<F>(f: F) -> Arc<FnSubscriber<F>>
where
    F: Fn(&Event) + Send + Sync + 'static,
{
    FnSubscriber::arc("fn", f)
}
