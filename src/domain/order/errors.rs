use crate::messaging::PublishError;
use crate::models::OrderId;
use crate::storage::StoreError;

// ============================================================================
// Order Workflow Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Order store error: {0}")]
    Store(#[from] StoreError),

    #[error("Order {0} not found")]
    NotFound(OrderId),

    /// Only produced under `PublishFailurePolicy::Surface`. The order is stored.
    #[error("Order {id} was stored but the notification failed: {source}")]
    NotNotified {
        id: OrderId,
        #[source]
        source: PublishError,
    },
}
