use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::events::Event;

/// Payload of a [`STATE_CHANGED`](super::STATE_CHANGED) event.
///
/// `previous` is `None` when the key was not set before. A key that held an
/// explicit `null` reports `Some(Value::Null)`; on the wire the field is
/// omitted in the first case and `null` in the second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub key: String,
    pub value: Value,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub previous: Option<Value>,
}

impl StateChange {
    /// Decodes the change carried by a `state.changed` event.
    ///
    /// Returns `None` if the payload does not have the expected shape.
    pub fn from_event(event: &Event) -> Option<Self> {
        Self::deserialize(event.payload.value()).ok()
    }

    pub(crate) fn to_value(&self) -> Value {
        let mut obj = serde_json::Map::with_capacity(3);
        obj.insert("key".into(), Value::String(self.key.clone()));
        obj.insert("value".into(), self.value.clone());
        if let Some(prev) = &self.previous {
            obj.insert("previous".into(), prev.clone());
        }
        Value::Object(obj)
    }
}

/// A field that is present is `Some`, even when it is `null`.
fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(d).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Payload;
    use serde_json::json;

    fn decode(v: Value) -> Option<StateChange> {
        StateChange::from_event(&Event::new(0, "state.changed", Payload::new(v)))
    }

    #[test]
    fn absent_previous_is_omitted() {
        let change = StateChange {
            key: "count".into(),
            value: json!(1),
            previous: None,
        };
        assert_eq!(change.to_value(), json!({ "key": "count", "value": 1 }));
        assert_eq!(serde_json::to_value(&change).unwrap(), change.to_value());
    }

    #[test]
    fn null_previous_is_distinct_from_absent() {
        let with_null = decode(json!({ "key": "k", "value": 2, "previous": null })).unwrap();
        assert_eq!(with_null.previous, Some(Value::Null));

        let absent = decode(json!({ "key": "k", "value": 2 })).unwrap();
        assert_eq!(absent.previous, None);
    }

    #[test]
    fn malformed_payload_decodes_to_none() {
        assert!(decode(json!({ "value": 2 })).is_none());
        assert!(decode(json!("nope")).is_none());
    }
}
