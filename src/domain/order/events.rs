use crate::messaging::Payload;
use crate::models::Order;

// ============================================================================
// Order Events - Notifications offered to the bus
// ============================================================================

/// Notification for a newly stored order.
///
/// Carries the order's content only; subscribers never see the storage key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlaced {
    pub customer: String,
    pub amount: String,
}

impl From<&Order> for OrderPlaced {
    fn from(order: &Order) -> Self {
        Self {
            customer: order.customer.clone(),
            amount: order.amount.clone(),
        }
    }
}

impl OrderPlaced {
    /// `amount` is tagged numeric so subscribers can filter on it.
    pub fn to_payload(&self) -> Payload {
        Payload::new()
            .text("customer", &self.customer)
            .number("amount", &self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::{AttributeType, PayloadValue};
    use crate::models::OrderId;

    #[test]
    fn test_payload_excludes_order_id() {
        let order = Order::new(OrderId::new_id(), "Alice Smith", "42.50");
        let payload = OrderPlaced::from(&order).to_payload();

        assert!(!payload.contains("id"));
        assert_eq!(
            payload.get("customer"),
            Some(&PayloadValue::Text("Alice Smith".into()))
        );
        assert_eq!(
            payload.get("amount"),
            Some(&PayloadValue::Number("42.50".into()))
        );
        assert_eq!(payload.attributes()["amount"].data_type, AttributeType::Number);
    }
}
