//! Namespace tree: nodes, subscriptions and tokens.
//!
//! ```text
//! root (never matched by publish)
//!  ├── "user" ── subs: [t0]
//!  │     └── "login" ── subs: [t1, t3(once)]
//!  └── "state"
//!        ├── "changed" ── subs: [t2]
//!        └── "reset"   ── subs: []        (emptied, kept)
//! ```
//!
//! - [`Node`]: child map keyed by segment, plus an ordered subscriber list
//! - [`Subscription`]: token, subscriber, fire-once flag, registration context
//! - [`SubscriptionTree`]: register / unregister / lookup / teardown

mod node;
mod registry;
mod subscription;
mod token;

pub use node::Node;
pub use registry::SubscriptionTree;
pub use subscription::{Subscription, SubscriptionInfo};
pub use token::{ParseTokenError, Token};
