//! Composition layer: elements, registries and the application object.
//!
//! Internal modules:
//! - [`scope`]: id + bus handle every element is built from; prefixes contexts with `id.`;
//! - [`element`]: the [`Element`] trait (closed method dispatch, destroy hook);
//! - [`registry`]: create / look up / call / destroy elements by id;
//! - [`application`]: three layers (models, views, controllers) plus the state store;
//! - [`builder`]: [`ApplicationBuilder`].

mod application;
mod builder;
mod element;
mod registry;
mod scope;

pub use application::{Application, Layer};
pub use builder::ApplicationBuilder;
pub use element::Element;
pub use registry::Registry;
pub use scope::Scope;
