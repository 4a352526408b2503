use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{EventPublisher, MessageAttribute, MessageId, Payload, PublishError, TopicRef};

/// A message as it was handed to the in-memory bus.
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub id: MessageId,
    pub topic: TopicRef,
    pub body: String,
    pub attributes: BTreeMap<String, MessageAttribute>,
}

/// Records published messages instead of sending them anywhere.
///
/// `fail_publishes(true)` makes every call fail with a transport error until
/// switched off again. Attempts are counted whether they succeed or not.
#[derive(Default)]
pub struct InMemoryPublisher {
    messages: Mutex<Vec<PublishedMessage>>,
    failing: AtomicBool,
    attempts: AtomicUsize,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_publishes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `publish` invocations, including failed ones.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub async fn messages(&self) -> Vec<PublishedMessage> {
        self.messages.lock().await.clone()
    }
}

#[async_trait]
impl EventPublisher for InMemoryPublisher {
    async fn publish(&self, topic: &TopicRef, payload: &Payload) -> Result<MessageId, PublishError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(PublishError::Transport(format!(
                "in-memory bus rejected message for {}",
                topic.address
            )));
        }

        let message = PublishedMessage {
            id: MessageId(Uuid::new_v4().to_string()),
            topic: topic.clone(),
            body: payload.to_json()?,
            attributes: payload.attributes(),
        };
        let id = message.id.clone();

        tracing::debug!(topic = %topic.address, message_id = %id, "Recorded in-memory message");
        self.messages.lock().await.push(message);

        Ok(id)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic() -> TopicRef {
        TopicRef {
            name: "ordersTopic".into(),
            address: "orders-topic".into(),
        }
    }

    #[tokio::test]
    async fn test_records_published_messages() {
        let publisher = InMemoryPublisher::new();
        let payload = Payload::new().text("customer", "Alice").number("amount", "1.00");

        let id = publisher.publish(&topic(), &payload).await.unwrap();

        let messages = publisher.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, id);
        assert_eq!(messages[0].topic.address, "orders-topic");
        assert!(messages[0].attributes.contains_key("amount"));
    }

    #[tokio::test]
    async fn test_failure_toggle_counts_attempts() {
        let publisher = InMemoryPublisher::new();
        publisher.fail_publishes(true);

        let result = publisher.publish(&topic(), &Payload::new()).await;

        assert!(matches!(result, Err(PublishError::Transport(_))));
        assert_eq!(publisher.attempts(), 1);
        assert!(publisher.messages().await.is_empty());
    }
}
