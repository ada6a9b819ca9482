//! # Application: three registries, three buses, one state store.
//!
//! ```text
//!            ┌──────────────────── Application ─────────────────────┐
//!            │                                                      │
//!            │  models: Registry ── Bus ◄── StateStore              │
//!            │  views: Registry ─── Bus                             │
//!            │  controllers: Registry ── Bus                        │
//!            └──────────────────────────────────────────────────────┘
//! ```
//!
//! The buses are independent: an event published on the views bus never
//! reaches model subscribers. Elements that need to cross layers hold a
//! handle to the other layer's bus (`app.models().bus().clone()`).

use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::CallError;
use crate::state::StateStore;

use super::{ApplicationBuilder, Registry};

/// One of the application's three element layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Models,
    Views,
    Controllers,
}

impl Layer {
    /// All layers, in teardown order.
    pub const ALL: [Layer; 3] = [Layer::Controllers, Layer::Views, Layer::Models];

    /// Lowercase plural name, used as the registry kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Models => "models",
            Layer::Views => "views",
            Layer::Controllers => "controllers",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level object wiring three registries and the state store together.
pub struct Application {
    pub(super) cfg: Config,
    pub(super) models: Registry,
    pub(super) views: Registry,
    pub(super) controllers: Registry,
    pub(super) state: StateStore,
}

impl Application {
    /// Starts building an application whose buses all use `cfg`.
    pub fn builder(cfg: Config) -> ApplicationBuilder {
        ApplicationBuilder::new(cfg)
    }

    /// Application with default configuration and no extra subscribers.
    pub fn new() -> Self {
        Self::builder(Config::default()).build()
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn models(&self) -> &Registry {
        &self.models
    }

    pub fn views(&self) -> &Registry {
        &self.views
    }

    pub fn controllers(&self) -> &Registry {
        &self.controllers
    }

    pub fn layer(&self, layer: Layer) -> &Registry {
        match layer {
            Layer::Models => &self.models,
            Layer::Views => &self.views,
            Layer::Controllers => &self.controllers,
        }
    }

    /// The state store; it publishes on the models bus.
    pub fn state(&self) -> &StateStore {
        &self.state
    }

    /// Path dispatch on one layer; see [`Registry::call`].
    pub fn call(&self, layer: Layer, path: &str, args: &Value) -> Result<Value, CallError> {
        self.layer(layer).call(path, args)
    }

    /// Destroys every element, discards the state and tears down all three buses.
    ///
    /// Idempotent.
    pub fn destroy(&self) {
        for layer in Layer::ALL {
            self.layer(layer).clear();
        }
        self.state.discard();
        for layer in Layer::ALL {
            self.layer(layer).bus().destroy();
        }
        debug!("application destroyed");
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Element, Scope};
    use crate::events::Payload;
    use crate::subscribers::subscriber_fn;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Plain {
        scope: Scope,
    }

    impl Element for Plain {
        fn scope(&self) -> &Scope {
            &self.scope
        }
    }

    #[test]
    fn buses_are_independent() {
        let app = Application::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        app.views().bus().subscribe("x", subscriber_fn(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        }));

        app.models().bus().publish("x", Payload::default());
        app.controllers().bus().publish("x", Payload::default());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(!app.models().bus().same_bus(app.views().bus()));
        assert!(!app.views().bus().same_bus(app.controllers().bus()));
    }

    #[test]
    fn state_publishes_on_models_bus() {
        let app = Application::new();
        app.state().set("count", 1);

        assert!(app.state().bus().same_bus(app.models().bus()));
        assert_eq!(&*app.models().bus().log()[0].context, "state.changed");
        assert_eq!(app.views().bus().log_len(), 0);
    }

    #[test]
    fn layers_and_call() {
        let app = Application::new();
        app.controllers().create("nav", |scope| Plain { scope });

        assert_eq!(app.layer(Layer::Controllers).ids(), ["nav"]);
        assert_eq!(
            app.call(Layer::Controllers, "nav.go", &json!(1)),
            Err(CallError::UnknownMethod {
                id: "nav".into(),
                method: "go".into()
            })
        );
        assert_eq!(
            app.call(Layer::Models, "nav.go", &json!(1)),
            Err(CallError::UnknownElement { id: "nav".into() })
        );
        assert_eq!(Layer::Views.to_string(), "views");
    }

    #[test]
    fn destroy_is_idempotent() {
        let app = Application::new();
        app.models().create("m", |scope| {
            scope.subscribe("changed", subscriber_fn(|_| {}));
            Plain { scope }
        });
        app.state().set("k", "v");

        app.destroy();
        app.destroy();
        for layer in Layer::ALL {
            assert!(app.layer(layer).is_empty());
            assert_eq!(app.layer(layer).bus().subscription_count(), 0);
            assert_eq!(app.layer(layer).bus().log_len(), 0);
        }
        assert!(app.state().is_empty());
    }
}
