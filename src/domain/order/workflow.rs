use std::sync::Arc;
use std::time::Instant;

use crate::messaging::{EventPublisher, TopicRef};
use crate::metrics::{Metrics, SubmissionOutcome};
use crate::models::{Order, OrderId};
use crate::storage::OrderStore;

use super::commands::SubmitOrder;
use super::errors::WorkflowError;
use super::events::OrderPlaced;
use super::state::{Notification, PublishFailurePolicy, SubmissionReceipt, SubmissionState};

// ============================================================================
// Order Submission Workflow
// ============================================================================
//
// Orchestrates: validate → new id → store put → bus publish → receipt
//
// A publish is only attempted after a successful store write. A failed
// publish never rolls back the stored order.
//
// ============================================================================

pub struct OrderWorkflow {
    store: Arc<dyn OrderStore>,
    publisher: Arc<dyn EventPublisher>,
    topic: TopicRef,
    policy: PublishFailurePolicy,
    metrics: Option<Arc<Metrics>>,
}

/// Tracks one submission through its states.
struct Submission {
    state: SubmissionState,
}

impl Submission {
    fn new() -> Self {
        Self {
            state: SubmissionState::Received,
        }
    }

    /// Illegal transitions are logged and leave the state unchanged.
    fn advance(&mut self, next: SubmissionState) {
        if !self.state.can_transition_to(next) {
            tracing::error!(from = ?self.state, to = ?next, "Illegal submission transition");
            return;
        }
        tracing::debug!(from = ?self.state, to = ?next, "Submission state change");
        self.state = next;
    }
}

impl OrderWorkflow {
    pub fn new(
        store: Arc<dyn OrderStore>,
        publisher: Arc<dyn EventPublisher>,
        topic: TopicRef,
    ) -> Self {
        Self {
            store,
            publisher,
            topic,
            policy: PublishFailurePolicy::default(),
            metrics: None,
        }
    }

    pub fn with_publish_failure_policy(mut self, policy: PublishFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Store a new order and notify the bus.
    ///
    /// Returns the receipt whenever the store write succeeded. Under the
    /// default policy a failed publish shows up as `Notification::Failed`.
    pub async fn submit(&self, command: SubmitOrder) -> Result<SubmissionReceipt, WorkflowError> {
        let started = Instant::now();
        let mut submission = Submission::new();

        let (customer, amount) = match command.validate() {
            Ok(fields) => fields,
            Err(e) => {
                submission.advance(SubmissionState::Aborted);
                tracing::info!(error = %e, "Rejected order submission");
                self.record_submission(SubmissionOutcome::Rejected, started);
                return Err(e.into());
            }
        };

        let order = Order::new(OrderId::new_id(), customer, amount);
        submission.advance(SubmissionState::IdAssigned);

        if let Err(e) = self.store.put(&order).await {
            submission.advance(SubmissionState::Aborted);
            tracing::error!(
                order_id = %order.id,
                backend = self.store.backend_name(),
                error = %e,
                "Failed to store order, nothing published"
            );
            self.record_store("put", false);
            self.record_submission(SubmissionOutcome::StoreFailed, started);
            return Err(e.into());
        }
        self.record_store("put", true);
        submission.advance(SubmissionState::Stored);
        tracing::info!(order_id = %order.id, "Order saved in store");

        let payload = OrderPlaced::from(&order).to_payload();
        let notification = match self.publisher.publish(&self.topic, &payload).await {
            Ok(message_id) => {
                submission.advance(SubmissionState::Published);
                tracing::info!(
                    order_id = %order.id,
                    topic = %self.topic.address,
                    message_id = %message_id,
                    "Order notification sent"
                );
                submission.advance(SubmissionState::Completed);
                Notification::Published(message_id)
            }
            Err(e) => {
                submission.advance(SubmissionState::Aborted);
                tracing::warn!(
                    order_id = %order.id,
                    topic = %self.topic.address,
                    error = %e,
                    "Order stored but notification failed"
                );
                Notification::Failed(e)
            }
        };

        match notification {
            Notification::Failed(source) => {
                self.record_publish(false);
                self.record_submission(SubmissionOutcome::NotNotified, started);
                match self.policy {
                    PublishFailurePolicy::Surface => Err(WorkflowError::NotNotified {
                        id: order.id,
                        source,
                    }),
                    PublishFailurePolicy::Tolerate => Ok(SubmissionReceipt {
                        id: order.id,
                        state: submission.state,
                        notification: Notification::Failed(source),
                    }),
                }
            }
            published @ Notification::Published(_) => {
                self.record_publish(true);
                self.record_submission(SubmissionOutcome::Completed, started);
                Ok(SubmissionReceipt {
                    id: order.id,
                    state: submission.state,
                    notification: published,
                })
            }
        }
    }

    /// Look up a stored order. Absence is `WorkflowError::NotFound`.
    pub async fn fetch(&self, id: &OrderId) -> Result<Order, WorkflowError> {
        let result = self.store.get(id).await;
        self.record_store("get", result.is_ok());

        match result {
            Ok(Some(order)) => {
                self.record_lookup("found");
                Ok(order)
            }
            Ok(None) => {
                tracing::debug!(order_id = %id, "Order not found");
                self.record_lookup("not_found");
                Err(WorkflowError::NotFound(*id))
            }
            Err(e) => {
                tracing::error!(order_id = %id, error = %e, "Failed to read order");
                self.record_lookup("error");
                Err(e.into())
            }
        }
    }

    fn record_submission(&self, outcome: SubmissionOutcome, started: Instant) {
        if let Some(metrics) = &self.metrics {
            metrics.record_submission(outcome, started.elapsed().as_secs_f64());
        }
    }

    fn record_store(&self, operation: &str, success: bool) {
        if let Some(metrics) = &self.metrics {
            metrics.record_store_operation(operation, success);
        }
    }

    fn record_publish(&self, success: bool) {
        if let Some(metrics) = &self.metrics {
            metrics.record_publish(success);
        }
    }

    fn record_lookup(&self, result: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_lookup(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::{AttributeType, InMemoryPublisher};
    use crate::storage::{InMemoryOrderStore, StoreError};

    fn topic() -> TopicRef {
        TopicRef {
            name: "ordersTopic".into(),
            address: "orders-topic".into(),
        }
    }

    fn setup() -> (Arc<InMemoryOrderStore>, Arc<InMemoryPublisher>, OrderWorkflow) {
        let store = Arc::new(InMemoryOrderStore::new());
        let publisher = Arc::new(InMemoryPublisher::new());
        let workflow = OrderWorkflow::new(store.clone(), publisher.clone(), topic());
        (store, publisher, workflow)
    }

    #[test]
    fn test_illegal_transition_is_refused() {
        let mut submission = Submission::new();
        submission.advance(SubmissionState::Stored);
        assert_eq!(submission.state, SubmissionState::Received);

        submission.advance(SubmissionState::Aborted);
        submission.advance(SubmissionState::IdAssigned);
        assert_eq!(submission.state, SubmissionState::Aborted);
    }

    #[tokio::test]
    async fn test_submit_then_fetch_returns_submitted_values() {
        let (_, _, workflow) = setup();

        let receipt = workflow
            .submit(SubmitOrder::new("Alice Smith", "42.50"))
            .await
            .unwrap();

        assert_eq!(receipt.state, SubmissionState::Completed);
        assert!(receipt.is_notified());

        let order = workflow.fetch(&receipt.id).await.unwrap();
        assert_eq!(order, Order::new(receipt.id, "Alice Smith", "42.50"));
    }

    #[tokio::test]
    async fn test_published_message_has_content_but_not_id() {
        let (_, publisher, workflow) = setup();

        let receipt = workflow
            .submit(SubmitOrder::new("Alice Smith", "42.50"))
            .await
            .unwrap();

        let messages = publisher.messages().await;
        assert_eq!(messages.len(), 1);

        let body: serde_json::Value = serde_json::from_str(&messages[0].body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"customer": "Alice Smith", "amount": "42.50"})
        );
        assert!(!messages[0].body.contains(&receipt.id.to_string()));
        assert_eq!(messages[0].attributes["amount"].data_type, AttributeType::Number);
        assert_eq!(messages[0].topic, topic());
    }

    #[tokio::test]
    async fn test_missing_amount_touches_nothing() {
        let (store, publisher, workflow) = setup();

        let result = workflow
            .submit(SubmitOrder {
                customer: Some("Alice".into()),
                amount: None,
            })
            .await;

        assert!(matches!(result, Err(WorkflowError::Validation(_))));
        assert_eq!(store.put_calls(), 0);
        assert_eq!(publisher.attempts(), 0);
    }

    #[tokio::test]
    async fn test_blank_customer_is_stored_unchanged() {
        let (store, _, workflow) = setup();

        let receipt = workflow.submit(SubmitOrder::new("   ", "42.50")).await.unwrap();

        assert_eq!(store.put_calls(), 1);
        let order = workflow.fetch(&receipt.id).await.unwrap();
        assert_eq!(order.customer, "   ");
        assert_eq!(order.amount, "42.50");
    }

    #[tokio::test]
    async fn test_store_failure_skips_publish() {
        let (store, publisher, workflow) = setup();
        store
            .fail_next_put(StoreError::Throttled("provisioned throughput exceeded".into()))
            .await;

        let result = workflow.submit(SubmitOrder::new("Alice", "10.00")).await;

        assert!(matches!(
            result,
            Err(WorkflowError::Store(StoreError::Throttled(_)))
        ));
        assert_eq!(publisher.attempts(), 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_publish_failure_keeps_order_and_returns_id() {
        let (_, publisher, workflow) = setup();
        publisher.fail_publishes(true);

        let receipt = workflow
            .submit(SubmitOrder::new("Bob", "7.25"))
            .await
            .unwrap();

        assert_eq!(receipt.state, SubmissionState::Aborted);
        assert!(matches!(receipt.notification, Notification::Failed(_)));
        assert_eq!(publisher.attempts(), 1);

        let order = workflow.fetch(&receipt.id).await.unwrap();
        assert_eq!(order.customer, "Bob");
        assert_eq!(order.amount, "7.25");
    }

    #[tokio::test]
    async fn test_surface_policy_reports_stored_id() {
        let (store, publisher, workflow) = setup();
        let workflow = workflow.with_publish_failure_policy(PublishFailurePolicy::Surface);
        publisher.fail_publishes(true);

        let result = workflow.submit(SubmitOrder::new("Bob", "7.25")).await;

        match result {
            Err(WorkflowError::NotNotified { id, .. }) => {
                assert!(store.get(&id).await.unwrap().is_some());
            }
            other => panic!("expected NotNotified, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_unknown_id_is_not_found() {
        let (_, _, workflow) = setup();
        let id = OrderId::new_id();

        assert!(matches!(
            workflow.fetch(&id).await,
            Err(WorkflowError::NotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn test_fetch_store_error_is_not_masked() {
        let (store, _, workflow) = setup();
        store
            .fail_next_get(StoreError::Unavailable("connection refused".into()))
            .await;

        assert!(matches!(
            workflow.fetch(&OrderId::new_id()).await,
            Err(WorkflowError::Store(StoreError::Unavailable(_)))
        ));
    }

    #[tokio::test]
    async fn test_metrics_record_outcomes() {
        let (_, publisher, workflow) = setup();
        let metrics = Arc::new(Metrics::new().unwrap());
        let workflow = workflow.with_metrics(metrics.clone());

        workflow.submit(SubmitOrder::new("Alice", "1.00")).await.unwrap();
        publisher.fail_publishes(true);
        workflow.submit(SubmitOrder::new("Bob", "2.00")).await.unwrap();
        let _ = workflow.submit(SubmitOrder::default()).await;

        let submissions = &metrics.submissions;
        assert_eq!(submissions.with_label_values(&["completed"]).get(), 1);
        assert_eq!(submissions.with_label_values(&["not_notified"]).get(), 1);
        assert_eq!(submissions.with_label_values(&["rejected"]).get(), 1);
        assert_eq!(metrics.publishes.with_label_values(&["error"]).get(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_submissions_are_independent() {
        let (store, publisher, workflow) = setup();
        let workflow = Arc::new(workflow);

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let workflow = workflow.clone();
                tokio::spawn(async move {
                    workflow
                        .submit(SubmitOrder::new(format!("customer-{i}"), format!("{i}.00")))
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.len().await, 50);
        assert_eq!(publisher.messages().await.len(), 50);
    }
}
