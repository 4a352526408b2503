use async_trait::async_trait;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::errors::{DbError, ExecutionError, RequestAttemptError};
use std::sync::Arc;

use super::{is_valid_identifier, OrderStore, StoreError};
use crate::models::{Order, OrderId};

const BACKEND: &str = "scylla";

/// Orders table in ScyllaDB: `id text PRIMARY KEY, customer text, amount text`.
pub struct ScyllaOrderStore {
    session: Arc<Session>,
    insert_query: String,
    select_query: String,
}

impl ScyllaOrderStore {
    /// Wrap an existing session. The table must already exist.
    pub fn new(session: Arc<Session>, keyspace: &str, table: &str) -> Result<Self, StoreError> {
        for name in [keyspace, table] {
            if !is_valid_identifier(name) {
                return Err(StoreError::InvalidKey(name.to_string()));
            }
        }

        Ok(Self {
            session,
            insert_query: format!(
                "INSERT INTO {keyspace}.{table} (id, customer, amount) VALUES (?, ?, ?)"
            ),
            select_query: format!(
                "SELECT id, customer, amount FROM {keyspace}.{table} WHERE id = ?"
            ),
        })
    }

    /// Connect to the cluster and make sure keyspace and table exist.
    pub async fn connect(nodes: &[String], keyspace: &str, table: &str) -> Result<Self, StoreError> {
        tracing::info!(nodes = ?nodes, keyspace = %keyspace, table = %table, "Connecting to ScyllaDB");

        let mut builder = SessionBuilder::new();
        for node in nodes {
            builder = builder.known_node(node);
        }
        let session = builder
            .build()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let store = Self::new(Arc::new(session), keyspace, table)?;
        store.ensure_schema(keyspace, table).await?;
        Ok(store)
    }

    async fn ensure_schema(&self, keyspace: &str, table: &str) -> Result<(), StoreError> {
        self.session
            .query_unpaged(
                format!(
                    "CREATE KEYSPACE IF NOT EXISTS {keyspace} WITH REPLICATION = \
                     {{'class': 'SimpleStrategy', 'replication_factor': 1}}"
                ),
                &[],
            )
            .await
            .map_err(classify)?;

        self.session
            .query_unpaged(
                format!(
                    "CREATE TABLE IF NOT EXISTS {keyspace}.{table} \
                     (id text PRIMARY KEY, customer text, amount text)"
                ),
                &[],
            )
            .await
            .map_err(classify)?;

        tracing::debug!(keyspace = %keyspace, table = %table, "Orders table ready");
        Ok(())
    }
}

#[async_trait]
impl OrderStore for ScyllaOrderStore {
    async fn put(&self, order: &Order) -> Result<(), StoreError> {
        self.session
            .query_unpaged(
                self.insert_query.as_str(),
                (
                    order.id.to_string(),
                    order.customer.clone(),
                    order.amount.clone(),
                ),
            )
            .await
            .map_err(classify)?;

        Ok(())
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        let result = self
            .session
            .query_unpaged(self.select_query.as_str(), (id.to_string(),))
            .await
            .map_err(classify)?;

        let rows_result = result.into_rows_result().map_err(backend_error)?;
        let row = rows_result
            .maybe_first_row::<(String, Option<String>, Option<String>)>()
            .map_err(backend_error)?;

        let Some((_, customer, amount)) = row else {
            return Ok(None);
        };

        let customer = customer.ok_or(StoreError::Corrupt {
            id: *id,
            attribute: "customer",
        })?;
        let amount = amount.ok_or(StoreError::Corrupt {
            id: *id,
            attribute: "amount",
        })?;

        Ok(Some(Order::new(*id, customer, amount)))
    }

    fn backend_name(&self) -> &'static str {
        BACKEND
    }
}

fn backend_error(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend {
        backend: BACKEND,
        message: e.to_string(),
    }
}

/// Sort driver errors into connectivity, throttling and everything else.
fn classify(error: ExecutionError) -> StoreError {
    match &error {
        ExecutionError::ConnectionPoolError(_) | ExecutionError::RequestTimeout(_) => {
            StoreError::Unavailable(error.to_string())
        }
        ExecutionError::LastAttemptError(RequestAttemptError::DbError(db_error, _)) => {
            match db_error {
                DbError::Overloaded | DbError::RateLimitReached { .. } => {
                    StoreError::Throttled(error.to_string())
                }
                DbError::Unavailable { .. }
                | DbError::ReadTimeout { .. }
                | DbError::WriteTimeout { .. }
                | DbError::IsBootstrapping => StoreError::Unavailable(error.to_string()),
                _ => backend_error(&error),
            }
        }
        _ => backend_error(&error),
    }
}
