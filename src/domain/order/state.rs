use serde::Serialize;
use std::str::FromStr;

use crate::messaging::{MessageId, PublishError};
use crate::models::OrderId;

// ============================================================================
// Submission State Machine
// ============================================================================
//
//   Received ──► IdAssigned ──► Stored ──► Published ──► Completed
//      │             │            │
//      └─────────────┴────────────┴──► Aborted
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubmissionState {
    Received,
    IdAssigned,
    Stored,
    Published,
    Completed,
    Aborted,
}

impl SubmissionState {
    pub fn can_transition_to(self, next: SubmissionState) -> bool {
        use SubmissionState::*;

        matches!(
            (self, next),
            (Received, IdAssigned)
                | (Received, Aborted)
                | (IdAssigned, Stored)
                | (IdAssigned, Aborted)
                | (Stored, Published)
                | (Stored, Aborted)
                | (Published, Completed)
        )
    }
}

/// Outcome of the notification step for a stored order.
#[derive(Debug, Clone)]
pub enum Notification {
    Published(MessageId),
    /// Stored, not notified. Nothing was rolled back.
    Failed(PublishError),
}

/// What a successful submission hands back to the caller.
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub id: OrderId,
    pub state: SubmissionState,
    pub notification: Notification,
}

impl SubmissionReceipt {
    pub fn is_notified(&self) -> bool {
        matches!(self.notification, Notification::Published(_))
    }
}

/// Whether a failed notification is reported as an error to the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishFailurePolicy {
    /// Return the receipt with `Notification::Failed`.
    #[default]
    Tolerate,
    /// Return `WorkflowError::NotNotified` carrying the stored id.
    Surface,
}

impl FromStr for PublishFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tolerate" => Ok(PublishFailurePolicy::Tolerate),
            "surface" => Ok(PublishFailurePolicy::Surface),
            other => Err(format!(
                "unknown publish failure policy '{other}' (expected 'tolerate' or 'surface')"
            )),
        }
    }
}
