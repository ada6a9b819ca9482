//! # Hierarchical event bus.
//!
//! [`Bus`] owns a [`SubscriptionTree`] and an event log and delivers each
//! published [`Event`] to every subscriber registered on a prefix of its context.
//!
//! ## Dispatch
//! ```text
//! publish("a.b.c", p)
//!   1. log.push(Event{seq, at, "a.b.c", p})
//!   2. root ─"a"─► node a     ─► subs(a)     in registration order
//!              ─"b"─► node a.b   ─► subs(a.b)   in registration order
//!              ─"c"─► node a.b.c ─► subs(a.b.c) in registration order
//!      (stops at the first missing segment)
//!   3. after each node: drop the fire-once subscriptions just delivered
//! ```
//!
//! ## Rules
//! - **Least to most specific**: subscribers on `a` run before those on `a.b`.
//! - **No lock across callbacks**: each node's list is snapshotted, then the
//!   lock is released before any subscriber runs. Subscribers may publish,
//!   subscribe or unsubscribe re-entrantly.
//! - **Snapshot per node**: subscriptions added to a node while it is being
//!   dispatched wait for the next publish; nodes deeper than the current one
//!   are resolved only when reached, so additions there are honored.
//! - **Removed means silent**: a subscription removed mid-dispatch (or consumed
//!   as fire-once by a re-entrant publish) is skipped.
//! - **Isolation**: a panicking subscriber is logged and skipped over.
//! - **No errors**: publishing to a namespace nobody listens on is a logged no-op.

use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, trace};

use crate::config::Config;
use crate::subscribers::Subscribe;
use crate::tree::{Subscription, SubscriptionInfo, SubscriptionTree, Token};

use super::dispatcher::{Dispatcher, PendingPublish};
use super::{segments, Event, Payload};

/// State guarded by one lock so teardown clears tree and log together.
#[derive(Default)]
struct Shared {
    tree: SubscriptionTree,
    log: VecDeque<Event>,
}

pub(crate) struct Inner {
    cfg: Config,
    shared: Mutex<Shared>,
    seq: AtomicU64,
    dispatcher: Dispatcher,
}

impl Inner {
    pub(super) fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

/// In-process publish/subscribe bus with namespace bubbling.
///
/// ### Properties
/// - **Synchronous**: `publish()` returns after every matching subscriber ran.
/// - **Deferred**: `publish_async()` runs the same algorithm later, FIFO.
/// - **Cloneable**: cheap to clone (an `Arc`); clones share tree, log and queue.
///
/// ### Example
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use nsbus::{subscriber_fn, Bus, Payload};
///
/// let bus = Bus::default();
/// let order = Arc::new(Mutex::new(Vec::new()));
///
/// let o = order.clone();
/// bus.subscribe("a.b", subscriber_fn(move |_| o.lock().unwrap().push("a.b")));
/// let o = order.clone();
/// bus.subscribe("a", subscriber_fn(move |_| o.lock().unwrap().push("a")));
///
/// bus.publish("a.b.c", Payload::default());
/// assert_eq!(*order.lock().unwrap(), ["a", "a.b"]);
/// ```
#[derive(Clone)]
pub struct Bus {
    inner: Arc<Inner>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.lock();
        f.debug_struct("Bus")
            .field("subscriptions", &shared.tree.len())
            .field("log_len", &shared.log.len())
            .field("cfg", &self.inner.cfg)
            .finish()
    }
}

impl Bus {
    /// Creates an empty bus.
    pub fn new(cfg: Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                cfg,
                shared: Mutex::new(Shared::default()),
                seq: AtomicU64::new(0),
                dispatcher: Dispatcher::new(),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    /// Configuration this bus was built with.
    pub fn config(&self) -> &Config {
        &self.inner.cfg
    }

    /// True if both handles refer to the same bus.
    pub fn same_bus(&self, other: &Bus) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ---------------------------
    // Registration
    // ---------------------------

    /// Registers `subscriber` on `context`; see [`SubscriptionTree::register`].
    ///
    /// [`Subscribe::name`] is read before the bus lock is taken, so a name
    /// that touches this bus cannot deadlock.
    pub fn register(&self, context: &str, subscriber: Arc<dyn Subscribe>, once: bool) -> Token {
        let name = Arc::from(subscriber.name());
        self.lock().tree.register_named(context, subscriber, name, once)
    }

    /// True while the subscription carrying `token` is registered.
    pub fn is_registered(&self, token: Token) -> bool {
        self.lock().tree.contains(token)
    }

    /// Subscribes to `context` and every namespace below it.
    pub fn subscribe(&self, context: &str, subscriber: Arc<dyn Subscribe>) -> Token {
        self.register(context, subscriber, false)
    }

    /// Like [`subscribe`](Bus::subscribe), but removed after its first delivery.
    pub fn subscribe_once(&self, context: &str, subscriber: Arc<dyn Subscribe>) -> Token {
        self.register(context, subscriber, true)
    }

    /// Removes the subscription carrying `token`; `false` if it is not registered.
    pub fn unregister(&self, token: Token) -> bool {
        self.lock().tree.unregister(token)
    }

    /// Alias of [`unregister`](Bus::unregister).
    pub fn unsubscribe(&self, token: Token) -> bool {
        self.unregister(token)
    }

    /// Describes the subscription carrying `token`.
    pub fn lookup(&self, token: Token) -> Option<SubscriptionInfo> {
        self.lock().tree.lookup(token)
    }

    /// Number of registered subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.lock().tree.len()
    }

    // ---------------------------
    // Publishing
    // ---------------------------

    /// Publishes `payload` under `context` and delivers it synchronously.
    ///
    /// Returns `self` for chaining.
    pub fn publish(&self, context: impl Into<Arc<str>>, payload: impl Into<Payload>) -> &Self {
        self.dispatch(context.into(), payload.into());
        self
    }

    /// Schedules [`publish`](Bus::publish) to run on the deferred queue.
    ///
    /// The returned future resolves with the published event after all of its
    /// subscribers ran. Deferred publishes run in the order they were scheduled.
    /// Requires a tokio runtime to make progress.
    pub fn publish_async(
        &self,
        context: impl Into<Arc<str>>,
        payload: impl Into<Payload>,
    ) -> PendingPublish {
        self.inner
            .dispatcher
            .submit(Arc::downgrade(&self.inner), context.into(), payload.into())
    }

    /// The synchronous publish algorithm; returns the logged event.
    pub(crate) fn dispatch(&self, context: Arc<str>, payload: Payload) -> Event {
        let seq = self.inner.seq.fetch_add(1, Ordering::Relaxed);
        let event = Event::new(seq, context, payload);
        self.record(&event);

        let path: Vec<&str> = segments(&event.context).collect();
        let mut delivered = 0usize;

        for depth in 1..=path.len() {
            let level = &path[..depth];
            let Some(subs) = self.lock().tree.snapshot(level) else {
                break;
            };

            let mut consumed = Vec::new();
            for sub in &subs {
                if !sub.claim() {
                    continue;
                }
                if sub.is_once() {
                    consumed.push(sub.token());
                }
                delivered += 1;
                self.deliver(sub, &event);
            }

            if !consumed.is_empty() {
                self.lock().tree.purge(level, &consumed);
            }
        }

        if delivered == 0 && self.inner.cfg.trace_unmatched {
            debug!(context = &*event.context, seq, "publish matched no subscriber");
        } else {
            trace!(context = &*event.context, seq, delivered, "published");
        }
        event
    }

    fn record(&self, event: &Event) {
        if !self.inner.cfg.record_log {
            return;
        }
        let mut shared = self.lock();
        shared.log.push_back(event.clone());
        if let Some(limit) = self.inner.cfg.log_limit() {
            while shared.log.len() > limit {
                shared.log.pop_front();
            }
        }
    }

    fn deliver(&self, sub: &Subscription, event: &Event) {
        let subscriber = sub.subscriber();
        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| subscriber.on_event(event))) {
            error!(
                subscriber = sub.name(),
                token = %sub.token(),
                context = &*event.context,
                panic = panic_message(&*panic),
                "subscriber panicked"
            );
        }
    }

    // ---------------------------
    // Log
    // ---------------------------

    /// Independent copy of the event log, oldest first.
    pub fn log(&self) -> Vec<Event> {
        self.lock().log.iter().cloned().collect()
    }

    /// Number of events currently in the log.
    pub fn log_len(&self) -> usize {
        self.lock().log.len()
    }

    /// Empties the event log.
    pub fn clear_log(&self) {
        self.lock().log.clear();
    }

    // ---------------------------
    // Teardown
    // ---------------------------

    /// Discards every subscription and the whole log in one step.
    ///
    /// Idempotent. Token numbering continues afterwards, so tokens issued
    /// before teardown are never handed out again. Subscribers already
    /// snapshotted by an in-flight publish at its current level still run;
    /// deeper levels are not reached.
    pub fn destroy(&self) {
        let mut shared = self.lock();
        shared.tree.teardown();
        shared.log.clear();
    }

    /// Counts of subscriptions per registration context (diagnostics).
    pub fn contexts(&self) -> HashMap<String, usize> {
        fn walk(node: &crate::tree::Node, out: &mut HashMap<String, usize>) {
            for sub in node.subscriptions() {
                *out.entry(sub.context().to_string()).or_default() += 1;
            }
            for (_, child) in node.children() {
                walk(child, out);
            }
        }
        let mut out = HashMap::new();
        walk(self.lock().tree.root(), &mut out);
        out
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.inner
            .shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic>")
}
