use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::subscribers::Subscribe;

use super::Token;

/// One registered subscriber at one node of the tree.
///
/// Nodes hold subscriptions behind `Arc` so a dispatch can work on a snapshot
/// of a node's list without holding the bus lock. The `live` flag is shared by
/// every snapshot: once cleared (by removal, teardown of the token, or a
/// fire-once delivery) no snapshot will invoke the subscription again.
pub struct Subscription {
    token: Token,
    subscriber: Arc<dyn Subscribe>,
    /// [`Subscribe::name`], taken once at registration.
    name: Arc<str>,
    once: bool,
    context: Arc<str>,
    live: AtomicBool,
}

impl Subscription {
    pub(crate) fn new(
        token: Token,
        context: Arc<str>,
        subscriber: Arc<dyn Subscribe>,
        name: Arc<str>,
        once: bool,
    ) -> Self {
        Self {
            token,
            name,
            subscriber,
            once,
            context,
            live: AtomicBool::new(true),
        }
    }

    #[inline]
    pub fn token(&self) -> Token {
        self.token
    }

    /// Context string as given at registration (informational).
    #[inline]
    pub fn context(&self) -> &str {
        &self.context
    }

    #[inline]
    pub fn is_once(&self) -> bool {
        self.once
    }

    #[inline]
    pub fn subscriber(&self) -> &Arc<dyn Subscribe> {
        &self.subscriber
    }

    /// Subscriber name as reported when it was registered.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Decides whether this subscription may be invoked now.
    ///
    /// A fire-once subscription is consumed by the first successful claim,
    /// including claims made by re-entrant publishes.
    pub(crate) fn claim(&self) -> bool {
        if self.once {
            self.live
                .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        } else {
            self.is_live()
        }
    }

    pub(crate) fn retire(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub(crate) fn info(&self) -> SubscriptionInfo {
        SubscriptionInfo {
            token: self.token,
            context: Arc::clone(&self.context),
            once: self.once,
            subscriber: self.name.to_string(),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("token", &self.token)
            .field("context", &self.context)
            .field("once", &self.once)
            .field("subscriber", &self.name)
            .field("live", &self.is_live())
            .finish()
    }
}

/// Read-only description of a registered subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionInfo {
    pub token: Token,
    pub context: Arc<str>,
    pub once: bool,
    /// [`Subscribe::name`] of the subscriber.
    pub subscriber: String,
}
