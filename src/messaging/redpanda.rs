use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    error::{KafkaError, RDKafkaErrorCode},
    message::{Header, OwnedHeaders},
    producer::{FutureProducer, FutureRecord},
    util::Timeout,
};
use std::time::Duration;
use uuid::Uuid;

use super::{EventPublisher, MessageId, Payload, PublishError, TopicRef};

const MESSAGE_ID_HEADER: &str = "message_id";
const DATA_TYPE_SUFFIX: &str = ".data_type";

/// Publishes to Redpanda (Kafka protocol).
///
/// Each message gets a fresh UUID as record key and `message_id` header;
/// that UUID is the returned `MessageId`. Numeric attributes travel as
/// headers `{field}` and `{field}.data_type = Number`.
pub struct RedpandaClient {
    producer: FutureProducer,
    send_timeout: Duration,
}

impl RedpandaClient {
    pub fn new(brokers: &str) -> Result<Self, PublishError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| PublishError::Transport(format!("Failed to create Redpanda producer: {e}")))?;

        tracing::info!(brokers = %brokers, "Redpanda producer created");

        Ok(Self {
            producer,
            send_timeout: Duration::from_secs(5),
        })
    }
}

/// Build the record headers for a payload.
fn headers_for(message_id: &str, payload: &Payload) -> OwnedHeaders {
    let mut headers = OwnedHeaders::new().insert(Header {
        key: MESSAGE_ID_HEADER,
        value: Some(message_id),
    });

    for (name, attribute) in payload.attributes() {
        let type_key = format!("{name}{DATA_TYPE_SUFFIX}");
        headers = headers
            .insert(Header {
                key: &name,
                value: Some(attribute.value.as_str()),
            })
            .insert(Header {
                key: &type_key,
                value: Some(attribute.data_type.as_str()),
            });
    }

    headers
}

fn classify(topic: &TopicRef, error: KafkaError) -> PublishError {
    match error.rdkafka_error_code() {
        Some(RDKafkaErrorCode::TopicAuthorizationFailed)
        | Some(RDKafkaErrorCode::ClusterAuthorizationFailed) => {
            PublishError::Unauthorized(topic.address.clone())
        }
        Some(RDKafkaErrorCode::UnknownTopicOrPartition) | Some(RDKafkaErrorCode::UnknownTopic) => {
            PublishError::UnknownTopic(topic.address.clone())
        }
        _ => PublishError::Transport(format!("Kafka send error: {error}")),
    }
}

#[async_trait]
impl EventPublisher for RedpandaClient {
    async fn publish(&self, topic: &TopicRef, payload: &Payload) -> Result<MessageId, PublishError> {
        let body = payload.to_json()?;
        let message_id = Uuid::new_v4().to_string();

        let record = FutureRecord::to(&topic.address)
            .key(&message_id)
            .payload(&body)
            .headers(headers_for(&message_id, payload));

        match self
            .producer
            .send(record, Timeout::After(self.send_timeout))
            .await
        {
            Ok(_) => {
                tracing::info!(
                    topic = %topic.address,
                    message_id = %message_id,
                    "Published to Redpanda"
                );
                Ok(MessageId(message_id))
            }
            Err((e, _)) => Err(classify(topic, e)),
        }
    }

    fn backend_name(&self) -> &'static str {
        "redpanda"
    }
}
