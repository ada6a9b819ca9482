//! # Example: todo_app
//!
//! A tiny model/view/controller wiring on top of [`Application`].
//!
//! Shows how to:
//! - Build elements from a [`Scope`] and register them by id.
//! - Dispatch `"elementId.method"` calls through a closed method enum.
//! - React to namespaced events and to state changes.
//! - Use `publish_async` from a tokio runtime.
//!
//! ## Flow
//! ```text
//! controllers.call("input.submit", "milk")
//!     └─► models bus: publish("todos.add", {title})
//!             └─► TodoList (listens "todos.add") ─► state.set("todos", [...])
//!                     └─► models bus: publish("state.changed", {...})
//!                             └─► LogWriter (subscribed on "state")
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example todo_app --features logging
//! ```

use std::str::FromStr;
use std::sync::Arc;

use nsbus::{
    subscriber_fn, Application, CallError, Config, Element, Layer, LogWriter, Scope, StateStore,
};
use serde_json::{json, Value};

/// Methods the input controller exposes.
enum InputMethod {
    Submit,
    Clear,
}

impl FromStr for InputMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "submit" => Ok(InputMethod::Submit),
            "clear" => Ok(InputMethod::Clear),
            _ => Err(()),
        }
    }
}

/// Controller: turns user input into model events.
struct Input {
    scope: Scope,
    models: nsbus::Bus,
}

impl Element for Input {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn call(&self, method: &str, args: &Value) -> Result<Value, CallError> {
        match method.parse::<InputMethod>() {
            Ok(InputMethod::Submit) => {
                let title = args
                    .as_str()
                    .ok_or_else(|| CallError::failed("title must be a string"))?;
                self.models.publish("todos.add", json!({ "title": title }));
                Ok(Value::Bool(true))
            }
            Ok(InputMethod::Clear) => {
                self.models.publish("todos.clear", Value::Null);
                Ok(Value::Bool(true))
            }
            Err(()) => Err(self.unknown_method(method)),
        }
    }
}

/// Model: keeps the list in the state store.
struct TodoList {
    scope: Scope,
}

impl TodoList {
    fn new(scope: Scope, state: StateStore) -> Self {
        let st = state.clone();
        scope.listen(
            "todos.add",
            subscriber_fn(move |ev| {
                let mut items = match st.get("todos") {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                };
                items.push(ev.payload["title"].clone());
                st.set("todos", items);
            }),
        );
        scope.listen(
            "todos.clear",
            subscriber_fn(move |_| {
                state.reset();
            }),
        );
        Self { scope }
    }
}

impl Element for TodoList {
    fn scope(&self) -> &Scope {
        &self.scope
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app = Application::builder(Config::default())
        .with_subscriber(Layer::Models, "state", Arc::new(LogWriter::new()))
        .build();

    let state = app.state().clone();
    app.models()
        .create("todoList", move |scope| TodoList::new(scope, state));

    let models = app.models().bus().clone();
    app.controllers()
        .create("input", move |scope| Input { scope, models });

    app.call(Layer::Controllers, "input.submit", &json!("milk"))?;
    app.call(Layer::Controllers, "input.submit", &json!("eggs"))?;
    println!("todos = {}", app.state().get("todos").unwrap_or(Value::Null));

    // unknown method: warned and returned, never panics
    if let Err(err) = app.call(Layer::Controllers, "input.explode", &Value::Null) {
        println!("call failed: {err} ({})", err.as_label());
    }

    // deferred publish through the element's own scope
    let input = app.controllers().get("input").ok_or("input missing")?;
    let ev = input.scope().publish_async("submitted", json!({ "n": 2 })).await?;
    println!("deferred publish ran: context={} seq={}", ev.context, ev.seq);

    app.call(Layer::Controllers, "input.clear", &Value::Null)?;
    println!("models log has {} events", app.models().bus().log_len());

    app.destroy();
    Ok(())
}
