//! # Subscription tree: registration, removal and lookup by token.
//!
//! ## Rules
//! - Registration walks (and creates) one node per segment, then appends to the
//!   final node's list. Insertion order is dispatch order within a node.
//! - Removal goes through a token index (token → segment path), so it touches
//!   only the nodes on that path.
//! - Teardown swaps in a fresh root; the token counter survives it.
//! - The tree is not synchronized; the owning [`Bus`](crate::Bus) wraps it in a lock.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::events::segments;
use crate::subscribers::Subscribe;

use super::{Node, Subscription, SubscriptionInfo, Token};

/// Namespace tree plus the bookkeeping needed to remove subscriptions by token.
#[derive(Debug, Default)]
pub struct SubscriptionTree {
    root: Node,
    index: HashMap<Token, Box<[String]>>,
    next_token: u64,
}

impl SubscriptionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `subscriber` under `context` and returns its token.
    ///
    /// A context with no segments (`""`, `"..."`) lands on the root's own list.
    /// Such a subscription is kept and can be removed by token, but publish
    /// never matches the root, so it is never invoked.
    pub fn register(
        &mut self,
        context: &str,
        subscriber: Arc<dyn Subscribe>,
        once: bool,
    ) -> Token {
        let name = Arc::from(subscriber.name());
        self.register_named(context, subscriber, name, once)
    }

    /// [`register`](Self::register) with the subscriber's name already resolved,
    /// so the caller can ask for it before taking any lock.
    pub(crate) fn register_named(
        &mut self,
        context: &str,
        subscriber: Arc<dyn Subscribe>,
        name: Arc<str>,
        once: bool,
    ) -> Token {
        let token = Token::from_raw(self.next_token);
        self.next_token += 1;

        let path: Box<[String]> = segments(context).map(str::to_string).collect();
        if path.is_empty() {
            warn!(%token, context, "subscription has no namespace segments; it will never be dispatched");
        }

        let sub = Subscription::new(token, Arc::from(context), subscriber, name, once);
        debug!(%token, context, once, subscriber = sub.name(), "subscribed");

        self.root.descend_or_insert(&path[..]).push(Arc::new(sub));
        self.index.insert(token, path);
        token
    }

    /// Removes the subscription carrying `token`.
    ///
    /// Returns `false` if no such subscription is registered (never was, already
    /// removed, or consumed as fire-once). Sibling and ancestor subscriptions are untouched.
    pub fn unregister(&mut self, token: Token) -> bool {
        let Some(path) = self.index.remove(&token) else {
            return false;
        };
        match self.root.descend_mut(&path[..]).and_then(|n| n.remove(token)) {
            Some(sub) => {
                sub.retire();
                debug!(%token, context = sub.context(), "unsubscribed");
                true
            }
            None => false,
        }
    }

    /// Describes the subscription carrying `token`, if registered.
    pub fn lookup(&self, token: Token) -> Option<SubscriptionInfo> {
        let path = self.index.get(&token)?;
        self.root
            .descend(&path[..])?
            .subscriptions()
            .iter()
            .find(|s| s.token() == token)
            .map(|s| s.info())
    }

    /// True while the subscription carrying `token` is registered.
    pub fn contains(&self, token: Token) -> bool {
        self.index.contains_key(&token)
    }

    /// Subscriptions at the node reached by `path`, or `None` if the path is
    /// not present in the tree.
    pub fn snapshot<S: AsRef<str>>(&self, path: &[S]) -> Option<Vec<Arc<Subscription>>> {
        self.root
            .descend(path)
            .map(|node| node.subscriptions().to_vec())
    }

    /// Drops the given (already consumed) fire-once subscriptions from the node at `path`.
    ///
    /// Tokens that are no longer present are skipped.
    pub fn purge<S: AsRef<str>>(&mut self, path: &[S], consumed: &[Token]) {
        let Some(node) = self.root.descend_mut(path) else {
            return;
        };
        for &token in consumed {
            if node.remove(token).is_some() {
                self.index.remove(&token);
            }
        }
    }

    /// Discards every node and subscription.
    pub fn teardown(&mut self) {
        let dropped = self.index.len();
        self.root = Node::default();
        self.index.clear();
        debug!(dropped, "subscription tree torn down");
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Number of registered subscriptions.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscribers::subscriber_fn;
    use std::collections::HashSet;

    fn noop() -> Arc<dyn Subscribe> {
        subscriber_fn(|_| {})
    }

    #[test]
    fn register_creates_nodes_per_segment() {
        let mut tree = SubscriptionTree::new();
        tree.register("a.b.c", noop(), false);

        let a = tree.root().child("a").expect("a");
        let b = a.child("b").expect("b");
        let c = b.child("c").expect("c");
        assert!(a.subscriptions().is_empty());
        assert!(b.subscriptions().is_empty());
        assert_eq!(c.subscriptions().len(), 1);
        assert_eq!(c.subscriptions()[0].context(), "a.b.c");
    }

    #[test]
    fn empty_segments_never_create_nodes() {
        let mut tree = SubscriptionTree::new();
        tree.register("..a...b.", noop(), false);

        assert_eq!(tree.root().children().count(), 1);
        assert!(tree.root().child("").is_none());
        assert!(tree.root().descend(&["a", "b"]).is_some());
    }

    #[test]
    fn empty_context_lands_on_root() {
        let mut tree = SubscriptionTree::new();
        let t = tree.register("..", noop(), false);

        assert_eq!(tree.root().subscriptions().len(), 1);
        assert_eq!(tree.root().children().count(), 0);
        assert!(tree.unregister(t));
        assert!(tree.root().subscriptions().is_empty());
    }

    #[test]
    fn tokens_are_unique_and_survive_teardown() {
        let mut tree = SubscriptionTree::new();
        let mut seen = HashSet::new();
        for i in 0..50 {
            assert!(seen.insert(tree.register(&format!("n{}.x", i % 7), noop(), false)));
        }
        tree.teardown();
        for _ in 0..50 {
            assert!(seen.insert(tree.register("y", noop(), false)));
        }
        assert_eq!(tree.len(), 50);
    }

    #[test]
    fn unregister_is_targeted() {
        let mut tree = SubscriptionTree::new();
        let a = tree.register("a", noop(), false);
        let ab = tree.register("a.b", noop(), false);
        let ab2 = tree.register("a.b", noop(), false);

        assert!(tree.unregister(ab));
        assert!(!tree.unregister(ab));

        let node = tree.root().descend(&["a", "b"]).unwrap();
        assert_eq!(node.subscriptions().len(), 1);
        assert_eq!(node.subscriptions()[0].token(), ab2);
        assert!(tree.lookup(a).is_some());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn unregister_retires_snapshots() {
        let mut tree = SubscriptionTree::new();
        let t = tree.register("a", noop(), false);
        let snap = tree.snapshot(&["a"]).unwrap();

        assert!(snap[0].is_live());
        tree.unregister(t);
        assert!(!snap[0].is_live());
    }

    #[test]
    fn unknown_token_is_not_found() {
        let mut tree = SubscriptionTree::new();
        assert!(!tree.unregister(Token::from_raw(99)));
        assert!(tree.lookup(Token::from_raw(99)).is_none());
    }

    #[test]
    fn lookup_describes_subscription() {
        let mut tree = SubscriptionTree::new();
        let t = tree.register("user.login", noop(), true);

        let info = tree.lookup(t).unwrap();
        assert_eq!(info.token, t);
        assert_eq!(&*info.context, "user.login");
        assert!(info.once);
        assert_eq!(info.subscriber, "fn");
        assert_eq!(tree.root().find(t).map(|s| s.token()), Some(t));
    }

    #[test]
    fn snapshot_stops_at_missing_segment() {
        let mut tree = SubscriptionTree::new();
        tree.register("x.y.q", noop(), false);

        assert!(tree.snapshot(&["x", "y"]).unwrap().is_empty());
        assert!(tree.snapshot(&["x", "y", "z"]).is_none());
    }

    #[test]
    fn purge_removes_consumed_only() {
        let mut tree = SubscriptionTree::new();
        let once = tree.register("a", noop(), true);
        let keep = tree.register("a", noop(), false);

        tree.purge(&["a"], &[once, Token::from_raw(1234)]);
        assert!(tree.lookup(once).is_none());
        assert!(tree.lookup(keep).is_some());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn emptied_nodes_are_kept() {
        let mut tree = SubscriptionTree::new();
        let t = tree.register("a.b", noop(), false);
        tree.unregister(t);

        assert!(tree.root().descend(&["a", "b"]).is_some());
        assert!(tree.is_empty());
    }
}
