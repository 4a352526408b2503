// ============================================================================
// Order Domain - submission workflow and read path
// ============================================================================
//
// - Commands (SubmitOrder and its presence check)
// - Events (OrderPlaced, the bus notification)
// - State (submission state machine, receipt, failure policy)
// - Errors (ValidationError, WorkflowError)
// - Workflow (OrderWorkflow: store then publish, fetch)
//
// ============================================================================

pub mod commands;
pub mod errors;
pub mod events;
pub mod state;
pub mod workflow;

// Re-export for convenience
pub use commands::*;
pub use errors::*;
pub use events::*;
pub use state::*;
pub use workflow::*;
