// ============================================================================
// Messaging - publish order notifications to a topic
// ============================================================================
//
// Logical topic names ("ordersTopic") are resolved to bus addresses once at
// startup through a `TopicRegistry`. Publishers send a JSON body plus typed
// attributes and hand back an opaque `MessageId`. No retry, no delivery
// confirmation beyond the bus accepting the send.
//
// ============================================================================

mod memory;
mod redpanda;

use async_trait::async_trait;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub use memory::{InMemoryPublisher, PublishedMessage};
pub use redpanda::RedpandaClient;

/// A topic resolved from configuration: logical name plus bus address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRef {
    pub name: String,
    pub address: String,
}

impl fmt::Display for TopicRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}

/// Mapping of logical topic names to bus addresses.
#[derive(Debug, Clone, Default)]
pub struct TopicRegistry {
    topics: HashMap<String, String>,
}

impl TopicRegistry {
    /// Parse a JSON object such as `{"ordersTopic": "orders-topic"}`.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let topics: HashMap<String, String> = serde_json::from_str(raw)?;
        Ok(Self { topics })
    }

    pub fn resolve(&self, name: &str) -> Result<TopicRef, PublishError> {
        self.topics
            .get(name)
            .map(|address| TopicRef {
                name: name.to_string(),
                address: address.clone(),
            })
            .ok_or_else(|| PublishError::UnknownTopic(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

/// A payload field. Both variants travel as strings in the body; `Number`
/// fields are additionally announced as numeric attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PayloadValue {
    Text(String),
    Number(String),
}

impl PayloadValue {
    pub fn as_str(&self) -> &str {
        match self {
            PayloadValue::Text(value) | PayloadValue::Number(value) => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Number,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::String => "String",
            AttributeType::Number => "Number",
        }
    }
}

/// Typed metadata attached alongside the body for subscriber-side filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageAttribute {
    pub data_type: AttributeType,
    pub value: String,
}

/// Ordered field map sent as the message body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    fields: BTreeMap<String, PayloadValue>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), PayloadValue::Text(value.into()));
        self
    }

    pub fn number(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), PayloadValue::Number(value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&PayloadValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// JSON body, e.g. `{"amount":"42.50","customer":"Alice Smith"}`.
    pub fn to_json(&self) -> Result<String, PublishError> {
        serde_json::to_string(&self.fields).map_err(|e| PublishError::Serialization(e.to_string()))
    }

    /// One attribute per numeric field.
    pub fn attributes(&self) -> BTreeMap<String, MessageAttribute> {
        self.fields
            .iter()
            .filter_map(|(name, value)| match value {
                PayloadValue::Number(v) => Some((
                    name.clone(),
                    MessageAttribute {
                        data_type: AttributeType::Number,
                        value: v.clone(),
                    },
                )),
                PayloadValue::Text(_) => None,
            })
            .collect()
    }
}

/// Opaque identifier the bus assigned to an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PublishError {
    #[error("Unknown topic '{0}'")]
    UnknownTopic(String),

    #[error("Not authorized to publish to '{0}'")]
    Unauthorized(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Failed to serialize payload: {0}")]
    Serialization(String),
}

/// Sends notification messages to a topic on the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &TopicRef, payload: &Payload) -> Result<MessageId, PublishError>;

    fn backend_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_resolves_configured_topic() {
        let registry = TopicRegistry::from_json(r#"{"ordersTopic": "orders-topic"}"#).unwrap();

        let topic = registry.resolve("ordersTopic").unwrap();
        assert_eq!(topic.name, "ordersTopic");
        assert_eq!(topic.address, "orders-topic");
    }

    #[test]
    fn test_registry_rejects_unknown_topic() {
        let registry = TopicRegistry::from_json(r#"{"ordersTopic": "orders-topic"}"#).unwrap();
        assert!(matches!(
            registry.resolve("paymentsTopic"),
            Err(PublishError::UnknownTopic(name)) if name == "paymentsTopic"
        ));
    }

    #[test]
    fn test_registry_rejects_non_object_json() {
        assert!(TopicRegistry::from_json("[\"orders\"]").is_err());
        assert!(TopicRegistry::from_json("not json").is_err());
    }

    #[test]
    fn test_payload_body_keeps_values_as_strings() {
        let payload = Payload::new()
            .text("customer", "Alice Smith")
            .number("amount", "42.50");

        let body: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"customer": "Alice Smith", "amount": "42.50"})
        );
    }

    #[test]
    fn test_only_numeric_fields_become_attributes() {
        let payload = Payload::new()
            .text("customer", "Alice Smith")
            .number("amount", "42.50");

        let attributes = payload.attributes();
        assert_eq!(attributes.len(), 1);

        let amount = &attributes["amount"];
        assert_eq!(amount.data_type, AttributeType::Number);
        assert_eq!(amount.data_type.as_str(), "Number");
        assert_eq!(amount.value, "42.50");
    }
}
