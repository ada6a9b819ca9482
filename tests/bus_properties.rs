use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use nsbus::{subscriber_fn, Bus, Event, Payload, StateChange, StateStore, Subscribe, Token};
use serde_json::{json, Value};

fn counter() -> (Arc<AtomicUsize>, Arc<dyn Subscribe>) {
    let n = Arc::new(AtomicUsize::new(0));
    let c = n.clone();
    let sub: Arc<dyn Subscribe> = subscriber_fn(move |_| {
        c.fetch_add(1, Ordering::SeqCst);
    });
    (n, sub)
}

fn tagged(tag: &'static str, out: &Arc<Mutex<Vec<&'static str>>>) -> Arc<dyn Subscribe> {
    let out = out.clone();
    subscriber_fn(move |_| out.lock().unwrap().push(tag))
}

#[test]
fn prefix_bubbling_fires_least_specific_first() {
    let bus = Bus::default();
    let out = Arc::new(Mutex::new(Vec::new()));

    bus.subscribe("a", tagged("a", &out));
    bus.publish("a.b.c", Payload::default());
    assert_eq!(*out.lock().unwrap(), ["a"]);

    out.lock().unwrap().clear();
    bus.subscribe("a.b", tagged("a.b", &out));
    bus.publish("a.b.c", Payload::default());
    assert_eq!(*out.lock().unwrap(), ["a", "a.b"]);
}

#[test]
fn no_match_without_intermediate_node() {
    let bus = Bus::default();
    let (n, sub) = counter();
    bus.subscribe("x.y.q", sub);

    bus.publish("x.y.z", Payload::default());
    assert_eq!(n.load(Ordering::SeqCst), 0);
    assert_eq!(bus.log_len(), 1);
}

#[test]
fn once_subscription_fires_once() {
    let bus = Bus::default();
    let (n, sub) = counter();
    let token = bus.subscribe_once("a", sub);

    bus.publish("a", Payload::default());
    bus.publish("a", Payload::default());
    assert_eq!(n.load(Ordering::SeqCst), 1);
    assert!(!bus.unsubscribe(token));
    assert!(bus.lookup(token).is_none());
}

#[test]
fn tokens_unique_and_removal_targeted() {
    let bus = Bus::default();
    let hits = Arc::new(AtomicUsize::new(0));
    let contexts = ["a", "a.b", "c", "c.d.e", "f.g"];

    let mut tokens = Vec::new();
    for i in 0..100 {
        let h = hits.clone();
        tokens.push(bus.subscribe(
            contexts[i % contexts.len()],
            subscriber_fn(move |_| {
                h.fetch_add(1, Ordering::SeqCst);
            }),
        ));
    }
    let unique: HashSet<Token> = tokens.iter().copied().collect();
    assert_eq!(unique.len(), 100);

    let log_before = bus.log_len();
    assert!(bus.unsubscribe(tokens[0]));
    assert_eq!(bus.log_len(), log_before);
    assert_eq!(bus.subscription_count(), 99);

    // one deep publish per context reaches every remaining subscriber once
    for ctx in ["a.b", "c.d.e", "f.g"] {
        bus.publish(ctx, Payload::default());
    }
    assert_eq!(hits.load(Ordering::SeqCst), 99);
}

#[test]
fn state_store_round_trip() {
    let bus = Bus::default();
    let store = StateStore::new(bus.clone());
    let changes = Arc::new(Mutex::new(Vec::new()));
    let resets = Arc::new(Mutex::new(Vec::<Value>::new()));

    let c = changes.clone();
    bus.subscribe("state.changed", subscriber_fn(move |ev: &Event| {
        c.lock().unwrap().push(StateChange::from_event(ev).unwrap());
    }));
    let r = resets.clone();
    bus.subscribe("state.reset", subscriber_fn(move |ev: &Event| {
        r.lock().unwrap().push(ev.payload.value().clone());
    }));

    store.set("count", 1);
    assert_eq!(store.get("count"), Some(json!(1)));
    assert_eq!(
        changes.lock().unwrap()[0],
        StateChange {
            key: "count".into(),
            value: json!(1),
            previous: None,
        }
    );

    store.reset();
    assert_eq!(store.get("count"), None);
    assert_eq!(*resets.lock().unwrap(), [json!({})]);
}

#[tokio::test]
async fn async_publishes_resolve_in_order() {
    let bus = Bus::default();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    bus.subscribe("a", subscriber_fn(move |ev| {
        s.lock().unwrap().push(ev.payload["n"].clone());
    }));

    let one = bus.publish_async("a", json!({ "n": 1 }));
    let two = bus.publish_async("a", json!({ "n": 2 }));
    let (one, two) = tokio::join!(one, two);

    assert_eq!(one.unwrap().payload["n"], 1);
    assert_eq!(two.unwrap().payload["n"], 2);
    assert_eq!(*seen.lock().unwrap(), [json!(1), json!(2)]);
}

#[test]
fn teardown_is_idempotent() {
    let bus = Bus::default();
    let (n, sub) = counter();
    bus.subscribe("a", sub);
    bus.publish("a", Payload::default());

    bus.destroy();
    assert_eq!(bus.subscription_count(), 0);
    assert!(bus.log().is_empty());

    bus.destroy();
    assert_eq!(bus.subscription_count(), 0);
    assert!(bus.log().is_empty());

    bus.publish("a", Payload::default());
    assert_eq!(n.load(Ordering::SeqCst), 1);
    let log = bus.log();
    assert_eq!(log.len(), 1);
    assert_eq!(&*log[0].context, "a");
}

#[test]
fn tokens_are_not_reused_after_teardown() {
    let bus = Bus::default();
    let (_, a) = counter();
    let before = bus.subscribe("a", a);
    bus.destroy();

    let (n, b) = counter();
    let after = bus.subscribe("a", b);
    assert_ne!(before, after);
    assert!(!bus.unsubscribe(before));

    bus.publish("a", Payload::default());
    assert_eq!(n.load(Ordering::SeqCst), 1);
}
