use std::sync::Arc;

use crate::config::Config;
use crate::events::Bus;
use crate::state::StateStore;
use crate::subscribers::Subscribe;

use super::{Application, Layer, Registry};

/// Builder for constructing an [`Application`] with optional observers.
pub struct ApplicationBuilder {
    cfg: Config,
    subscribers: Vec<(Layer, String, Arc<dyn Subscribe>)>,
}

impl ApplicationBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Registers `subscriber` on `context` of `layer`'s bus before any element exists.
    ///
    /// Useful for application-wide observers, e.g. a `LogWriter` on `"state"`.
    pub fn with_subscriber(
        mut self,
        layer: Layer,
        context: impl Into<String>,
        subscriber: Arc<dyn Subscribe>,
    ) -> Self {
        self.subscribers.push((layer, context.into(), subscriber));
        self
    }

    /// Builds the application.
    ///
    /// This consumes the builder and initializes:
    /// - one bus and one registry per layer
    /// - the state store, attached to the models bus
    /// - the requested observers
    pub fn build(self) -> Application {
        let registry = |layer: Layer| Registry::new(layer.as_str(), Bus::new(self.cfg.clone()));

        let models = registry(Layer::Models);
        let views = registry(Layer::Views);
        let controllers = registry(Layer::Controllers);
        let state = StateStore::new(models.bus().clone());

        let app = Application {
            cfg: self.cfg,
            models,
            views,
            controllers,
            state,
        };
        for (layer, context, sub) in self.subscribers {
            app.layer(layer).bus().subscribe(&context, sub);
        }
        app
    }
}
