use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::events::{scoped, Bus, Payload, PendingPublish};
use crate::subscribers::Subscribe;
use crate::tree::Token;

/// Identity plus bus handle that every registered element is built from.
///
/// `publish` / `subscribe` and friends prefix contexts with `id.`, so an element
/// named `userModel` publishing `onLogin` emits `userModel.onLogin`. `listen`
/// subscribes to an absolute context instead (e.g. another element's events).
///
/// Every token obtained through the scope is remembered; [`Scope::release`]
/// removes them all, which the registry does when the element is destroyed.
/// Tokens the bus already dropped (fired once-subscriptions) are forgotten the
/// next time the scope tracks a token or reports what it holds.
#[derive(Clone)]
pub struct Scope {
    id: Arc<str>,
    bus: Bus,
    tokens: Arc<Mutex<Vec<Token>>>,
}

impl Scope {
    pub fn new(id: impl Into<Arc<str>>, bus: Bus) -> Self {
        Self {
            id: id.into(),
            bus,
            tokens: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// `id.context`.
    pub fn context(&self, context: &str) -> String {
        scoped(&self.id, context)
    }

    /// Publishes `id.context`.
    pub fn publish(&self, context: &str, payload: impl Into<Payload>) -> &Self {
        self.bus.publish(self.context(context), payload);
        self
    }

    /// Deferred publish of `id.context`.
    pub fn publish_async(&self, context: &str, payload: impl Into<Payload>) -> PendingPublish {
        self.bus.publish_async(self.context(context), payload)
    }

    /// Subscribes to `id.context`.
    pub fn subscribe(&self, context: &str, subscriber: Arc<dyn Subscribe>) -> Token {
        self.track(self.bus.subscribe(&self.context(context), subscriber))
    }

    /// Fire-once subscription to `id.context`.
    pub fn subscribe_once(&self, context: &str, subscriber: Arc<dyn Subscribe>) -> Token {
        self.track(self.bus.subscribe_once(&self.context(context), subscriber))
    }

    /// Subscribes to an absolute `context` (no `id.` prefix).
    pub fn listen(&self, context: &str, subscriber: Arc<dyn Subscribe>) -> Token {
        self.track(self.bus.subscribe(context, subscriber))
    }

    /// Removes one subscription made through this scope.
    pub fn unsubscribe(&self, token: Token) -> bool {
        self.tokens().retain(|t| *t != token);
        self.bus.unsubscribe(token)
    }

    /// Removes every subscription made through this scope.
    ///
    /// Returns how many were still registered (fire-once subscriptions that
    /// already fired are not counted).
    pub fn release(&self) -> usize {
        let tokens = std::mem::take(&mut *self.tokens());
        tokens
            .into_iter()
            .filter(|t| self.bus.unsubscribe(*t))
            .count()
    }

    /// Tokens obtained through this scope that are still registered.
    pub fn tokens_held(&self) -> Vec<Token> {
        let mut tokens = self.tokens();
        self.prune(&mut tokens);
        tokens.clone()
    }

    fn track(&self, token: Token) -> Token {
        let mut tokens = self.tokens();
        self.prune(&mut tokens);
        tokens.push(token);
        token
    }

    fn prune(&self, tokens: &mut Vec<Token>) {
        tokens.retain(|t| self.bus.is_registered(*t));
    }

    fn tokens(&self) -> std::sync::MutexGuard<'_, Vec<Token>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("tokens", &self.tokens().len())
            .finish()
    }
}
