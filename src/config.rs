//! Process configuration, resolved once at startup from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `BIND_ADDR` | `0.0.0.0:5000` |
//! | `ORDERS_STORE_BACKEND` | `scylla` (`scylla`, `redis`, `memory`) |
//! | `SCYLLA_NODES` | `127.0.0.1:9042` (comma separated) |
//! | `SCYLLA_KEYSPACE` | `orders_ks` |
//! | `REDIS_URL` | `redis://127.0.0.1:6379` |
//! | `ORDERS_TABLE_NAME` | `orders` |
//! | `ORDERS_BUS_BACKEND` | `redpanda` (`redpanda`, `memory`) |
//! | `REDPANDA_BROKERS` | `127.0.0.1:9092` |
//! | `ORDERS_TOPIC_MAP` | `{"ordersTopic":"orders-topic"}` |
//! | `ORDERS_TOPIC_NAME` | `ordersTopic` |
//! | `PUBLISH_FAILURE_POLICY` | `tolerate` (`tolerate`, `surface`) |

use std::net::SocketAddr;

use crate::domain::order::PublishFailurePolicy;
use crate::messaging::{TopicRef, TopicRegistry};
use crate::storage::is_valid_identifier;

const DEFAULT_TOPIC_MAP: &str = r#"{"ordersTopic":"orders-topic"}"#;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("{var} is not valid JSON object of topic names: {source}")]
    TopicMap {
        var: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Topic '{0}' is not present in ORDERS_TOPIC_MAP")]
    UnmappedTopic(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Scylla { nodes: Vec<String>, keyspace: String },
    Redis { url: String },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusBackend {
    Redpanda { brokers: String },
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub table_name: String,
    pub bus: BusBackend,
    pub topics: TopicRegistry,
    pub orders_topic: TopicRef,
    pub publish_failure_policy: PublishFailurePolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Unset and empty values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let bind_addr = get("BIND_ADDR", "0.0.0.0:5000")
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let table_name = get("ORDERS_TABLE_NAME", "orders");
        require_identifier("ORDERS_TABLE_NAME", &table_name)?;

        let store = match get("ORDERS_STORE_BACKEND", "scylla").to_ascii_lowercase().as_str() {
            "scylla" => {
                let keyspace = get("SCYLLA_KEYSPACE", "orders_ks");
                require_identifier("SCYLLA_KEYSPACE", &keyspace)?;
                let nodes: Vec<String> = get("SCYLLA_NODES", "127.0.0.1:9042")
                    .split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(String::from)
                    .collect();
                if nodes.is_empty() {
                    return Err(ConfigError::Invalid {
                        var: "SCYLLA_NODES",
                        reason: "no nodes listed".to_string(),
                    });
                }
                StoreBackend::Scylla { nodes, keyspace }
            }
            "redis" => StoreBackend::Redis {
                url: get("REDIS_URL", "redis://127.0.0.1:6379"),
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    var: "ORDERS_STORE_BACKEND",
                    reason: format!("unknown backend '{other}'"),
                })
            }
        };

        let bus = match get("ORDERS_BUS_BACKEND", "redpanda").to_ascii_lowercase().as_str() {
            "redpanda" => BusBackend::Redpanda {
                brokers: get("REDPANDA_BROKERS", "127.0.0.1:9092"),
            },
            "memory" => BusBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    var: "ORDERS_BUS_BACKEND",
                    reason: format!("unknown backend '{other}'"),
                })
            }
        };

        let topics = TopicRegistry::from_json(&get("ORDERS_TOPIC_MAP", DEFAULT_TOPIC_MAP))
            .map_err(|source| ConfigError::TopicMap {
                var: "ORDERS_TOPIC_MAP",
                source,
            })?;
        if topics.is_empty() {
            return Err(ConfigError::Invalid {
                var: "ORDERS_TOPIC_MAP",
                reason: "no topics mapped".to_string(),
            });
        }

        let topic_name = get("ORDERS_TOPIC_NAME", "ordersTopic");
        let orders_topic = topics
            .resolve(&topic_name)
            .map_err(|_| ConfigError::UnmappedTopic(topic_name.clone()))?;

        let publish_failure_policy = get("PUBLISH_FAILURE_POLICY", "tolerate")
            .parse::<PublishFailurePolicy>()
            .map_err(|reason| ConfigError::Invalid {
                var: "PUBLISH_FAILURE_POLICY",
                reason,
            })?;

        Ok(Self {
            bind_addr,
            store,
            table_name,
            bus,
            topics,
            orders_topic,
            publish_failure_policy,
        })
    }
}

fn require_identifier(var: &'static str, value: &str) -> Result<(), ConfigError> {
    if is_valid_identifier(value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            var,
            reason: format!("'{value}' must start with a letter and contain only letters, digits and '_'"),
        })
    }
}
