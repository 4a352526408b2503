// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

use super::errors::ValidationError;

/// A raw submission as it arrives from the form. Fields may be absent.
#[derive(Debug, Clone, Default)]
pub struct SubmitOrder {
    pub customer: Option<String>,
    pub amount: Option<String>,
}

impl SubmitOrder {
    pub fn new(customer: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            customer: Some(customer.into()),
            amount: Some(amount.into()),
        }
    }

    /// Presence check only. Values are returned untouched.
    pub fn validate(self) -> Result<(String, String), ValidationError> {
        let customer = self.customer.ok_or(ValidationError::MissingField("customer"))?;
        let amount = self.amount.ok_or(ValidationError::MissingField("amount"))?;
        Ok((customer, amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_submission_keeps_values_verbatim() {
        let (customer, amount) = SubmitOrder::new(" Alice Smith ", "42.50").validate().unwrap();
        assert_eq!(customer, " Alice Smith ");
        assert_eq!(amount, "42.50");
    }

    #[test]
    fn test_amount_is_not_numerically_checked() {
        let (_, amount) = SubmitOrder::new("Alice", "a lot").validate().unwrap();
        assert_eq!(amount, "a lot");
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let missing_amount = SubmitOrder {
            customer: Some("Alice".into()),
            amount: None,
        };
        assert_eq!(
            missing_amount.validate(),
            Err(ValidationError::MissingField("amount"))
        );

        assert_eq!(
            SubmitOrder::default().validate(),
            Err(ValidationError::MissingField("customer"))
        );
    }

    #[test]
    fn test_blank_fields_are_present() {
        let (customer, amount) = SubmitOrder::new("   ", "").validate().unwrap();
        assert_eq!(customer, "   ");
        assert_eq!(amount, "");
    }
}
