use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, RwLock};

use super::{OrderStore, StoreError};
use crate::models::{Order, OrderId};

/// Process-local order store.
///
/// Supports fault injection so callers can exercise the store-failure paths.
#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
    injected_put_failure: Mutex<Option<StoreError>>,
    injected_get_failure: Mutex<Option<StoreError>>,
    put_calls: AtomicUsize,
    get_calls: AtomicUsize,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `put` fail with `error`.
    pub async fn fail_next_put(&self, error: StoreError) {
        *self.injected_put_failure.lock().await = Some(error);
    }

    /// Make the next `get` fail with `error`.
    pub async fn fail_next_get(&self, error: StoreError) {
        *self.injected_get_failure.lock().await = Some(error);
    }

    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn put(&self, order: &Order) -> Result<(), StoreError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.injected_put_failure.lock().await.take() {
            return Err(error);
        }

        self.orders.write().await.insert(order.id, order.clone());
        Ok(())
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.injected_get_failure.lock().await.take() {
            return Err(error);
        }

        Ok(self.orders.read().await.get(id).cloned())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
