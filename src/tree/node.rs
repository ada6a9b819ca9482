use std::collections::HashMap;
use std::sync::Arc;

use super::{Subscription, Token};

/// One namespace level.
///
/// Children are keyed by a single non-empty segment; the subscriber list is a
/// separate field, so a segment can never collide with subscriber storage.
/// Nodes are created on first subscription through them and are not pruned
/// when their list becomes empty.
#[derive(Debug, Default)]
pub struct Node {
    children: HashMap<String, Node>,
    subs: Vec<Arc<Subscription>>,
}

impl Node {
    pub fn child(&self, segment: &str) -> Option<&Node> {
        self.children.get(segment)
    }

    /// Follows `path` from this node; `None` as soon as a segment is missing.
    pub fn descend<S: AsRef<str>>(&self, path: &[S]) -> Option<&Node> {
        path.iter()
            .try_fold(self, |node, seg| node.child(seg.as_ref()))
    }

    pub(crate) fn descend_mut<S: AsRef<str>>(&mut self, path: &[S]) -> Option<&mut Node> {
        path.iter()
            .try_fold(self, |node, seg| node.children.get_mut(seg.as_ref()))
    }

    /// Follows `path`, creating missing nodes.
    pub(crate) fn descend_or_insert<S: AsRef<str>>(&mut self, path: &[S]) -> &mut Node {
        path.iter().fold(self, |node, seg| {
            node.children.entry(seg.as_ref().to_string()).or_default()
        })
    }

    pub fn subscriptions(&self) -> &[Arc<Subscription>] {
        &self.subs
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn push(&mut self, sub: Arc<Subscription>) {
        self.subs.push(sub);
    }

    /// Removes the subscription carrying `token`; returns it if present.
    pub(crate) fn remove(&mut self, token: Token) -> Option<Arc<Subscription>> {
        let idx = self.subs.iter().position(|s| s.token() == token)?;
        Some(self.subs.remove(idx))
    }

    /// Depth-first search for `token` in this subtree.
    pub fn find(&self, token: Token) -> Option<&Arc<Subscription>> {
        self.subs
            .iter()
            .find(|s| s.token() == token)
            .or_else(|| self.children.values().find_map(|c| c.find(token)))
    }

    /// Number of subscriptions in this subtree.
    pub fn count(&self) -> usize {
        self.subs.len() + self.children.values().map(Node::count).sum::<usize>()
    }
}
