// ============================================================================
// Order Storage - single-item put/get by primary key
// ============================================================================
//
// Backends:
// - scylla  - `{keyspace}.{table}` with text columns id, customer, amount
// - redis   - one hash per order at `{table}:{id}`
// - memory  - process-local map, used for local runs and tests
//
// Clients never retry. Retry policy belongs to whatever wraps them.
//
// ============================================================================

mod memory;
mod redis_store;
mod scylla_store;

use async_trait::async_trait;

use crate::models::{Order, OrderId};

pub use self::memory::InMemoryOrderStore;
pub use self::redis_store::RedisOrderStore;
pub use self::scylla_store::ScyllaOrderStore;

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store throttled the request: {0}")]
    Throttled(String),

    #[error("Invalid key '{0}'")]
    InvalidKey(String),

    #[error("Stored record for {id} is missing attribute '{attribute}'")]
    Corrupt { id: OrderId, attribute: &'static str },

    #[error("{backend} error: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },
}

impl StoreError {
    /// Whether the failure looks like a temporary condition of the backend.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Throttled(_))
    }
}

/// Key-value persistence of orders.
///
/// Implementations must be safe to share across concurrent requests
/// without external locking.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Write the full record keyed by `order.id`, overwriting any existing one.
    async fn put(&self, order: &Order) -> Result<(), StoreError>;

    /// Read a record. Absence is `Ok(None)`, never an error.
    async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// Backend name, used in logs and metrics labels.
    fn backend_name(&self) -> &'static str;
}

/// Returns true when `name` is usable as an unquoted CQL identifier or key prefix.
pub(crate) fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    name.len() <= 48 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
