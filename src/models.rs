use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Domain Models
// ============================================================================

/// Identifier of a stored order.
///
/// Always rendered in the hyphenated 8-4-4-4-12 form, which is also the
/// store's primary key.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Generate a fresh identifier from local randomness (UUID v4).
    ///
    /// No shared counter is involved, so concurrent requests never coordinate.
    pub fn new_id() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for OrderId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid order id '{input}': expected a hyphenated UUID")]
pub struct InvalidOrderId {
    pub input: String,
    #[source]
    pub source: Option<uuid::Error>,
}

/// 8-4-4-4-12 hex groups. `Uuid::parse_str` alone also takes the simple,
/// braced and URN forms.
fn is_hyphenated(s: &str) -> bool {
    s.len() == 36
        && s.char_indices().all(|(i, c)| match i {
            8 | 13 | 18 | 23 => c == '-',
            _ => c.is_ascii_hexdigit(),
        })
}

impl FromStr for OrderId {
    type Err = InvalidOrderId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_hyphenated(s) {
            return Err(InvalidOrderId {
                input: s.to_string(),
                source: None,
            });
        }
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|source| InvalidOrderId {
                input: s.to_string(),
                source: Some(source),
            })
    }
}

/// The only persisted entity.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub customer: String,
    /// Carried as submitted; no numeric check is applied.
    pub amount: String,
}

impl Order {
    pub fn new(id: OrderId, customer: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            id,
            customer: customer.into(),
            amount: amount.into(),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: HashSet<OrderId> = (0..5_000).map(|_| OrderId::new_id()).collect();
        assert_eq!(ids.len(), 5_000);
    }

    #[test]
    fn test_id_renders_as_hyphenated_uuid() {
        let id = OrderId::new_id();
        let text = id.to_string();

        let groups: Vec<usize> = text.split('-').map(str::len).collect();
        assert_eq!(groups, vec![8, 4, 4, 4, 12]);
        assert!(text.chars().all(|c| c == '-' || c.is_ascii_hexdigit()));
        assert_eq!(text.parse::<OrderId>().unwrap(), id);
    }

    #[test]
    fn test_ids_from_many_threads_do_not_collide() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| (0..500).map(|_| OrderId::new_id()).collect::<Vec<_>>()))
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 4_000);
    }

    #[test]
    fn test_malformed_id_is_rejected() {
        let err = "not-a-uuid".parse::<OrderId>().unwrap_err();
        assert_eq!(err.input, "not-a-uuid");
    }

    #[test]
    fn test_only_hyphenated_form_is_accepted() {
        let id = OrderId::new_id();
        let uuid = Uuid::parse_str(&id.to_string()).unwrap();

        assert_eq!(id.to_string().to_uppercase().parse::<OrderId>().unwrap(), id);
        for form in [
            uuid.simple().to_string(),
            uuid.braced().to_string(),
            uuid.urn().to_string(),
            format!(" {id}"),
        ] {
            assert!(form.parse::<OrderId>().is_err(), "{form} should be rejected");
        }
    }

    #[test]
    fn test_order_serialization_uses_plain_id_string() {
        let id = OrderId::new_id();
        let order = Order::new(id, "Alice Smith", "42.50");

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["id"], id.to_string());
        assert_eq!(json["customer"], "Alice Smith");
        assert_eq!(json["amount"], "42.50");
    }
}
