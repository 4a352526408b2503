use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::RedisError;
use std::collections::HashMap;

use super::{is_valid_identifier, OrderStore, StoreError};
use crate::models::{Order, OrderId};

const BACKEND: &str = "redis";

/// Orders kept as Redis hashes at `{prefix}:{id}` with fields id, customer, amount.
pub struct RedisOrderStore {
    connection: MultiplexedConnection,
    key_prefix: String,
}

impl RedisOrderStore {
    pub async fn connect(url: &str, key_prefix: &str) -> Result<Self, StoreError> {
        if !is_valid_identifier(key_prefix) {
            return Err(StoreError::InvalidKey(key_prefix.to_string()));
        }

        tracing::info!(url = %url, key_prefix = %key_prefix, "Connecting to Redis");

        let client = redis::Client::open(url).map_err(classify)?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(classify)?;

        Ok(Self {
            connection,
            key_prefix: key_prefix.to_string(),
        })
    }

    fn key(&self, id: &OrderId) -> String {
        format!("{}:{}", self.key_prefix, id)
    }
}

#[async_trait]
impl OrderStore for RedisOrderStore {
    async fn put(&self, order: &Order) -> Result<(), StoreError> {
        // MultiplexedConnection is a cheap handle onto one shared pipeline.
        let mut conn = self.connection.clone();

        redis::cmd("HSET")
            .arg(self.key(&order.id))
            .arg("id")
            .arg(order.id.to_string())
            .arg("customer")
            .arg(&order.customer)
            .arg("amount")
            .arg(&order.amount)
            .query_async::<()>(&mut conn)
            .await
            .map_err(classify)?;

        Ok(())
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        let mut conn = self.connection.clone();

        let mut fields: HashMap<String, String> = redis::cmd("HGETALL")
            .arg(self.key(id))
            .query_async(&mut conn)
            .await
            .map_err(classify)?;

        if fields.is_empty() {
            return Ok(None);
        }

        let customer = fields.remove("customer").ok_or(StoreError::Corrupt {
            id: *id,
            attribute: "customer",
        })?;
        let amount = fields.remove("amount").ok_or(StoreError::Corrupt {
            id: *id,
            attribute: "amount",
        })?;

        Ok(Some(Order::new(*id, customer, amount)))
    }

    fn backend_name(&self) -> &'static str {
        BACKEND
    }
}

fn classify(error: RedisError) -> StoreError {
    if error.is_io_error()
        || error.is_connection_refusal()
        || error.is_connection_dropped()
        || error.is_timeout()
    {
        StoreError::Unavailable(error.to_string())
    } else {
        StoreError::Backend {
            backend: BACKEND,
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redis::ErrorKind;
    use std::io;

    #[test]
    fn test_io_errors_are_unavailable() {
        let refused = RedisError::from(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert!(matches!(classify(refused), StoreError::Unavailable(_)));

        let timed_out = RedisError::from(io::Error::new(io::ErrorKind::TimedOut, "timed out"));
        let err = classify(timed_out);
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_response_errors_are_backend_errors() {
        let wrong_type = RedisError::from((ErrorKind::TypeError, "WRONGTYPE"));
        assert!(matches!(
            classify(wrong_type),
            StoreError::Backend { backend: "redis", .. }
        ));
    }
}
