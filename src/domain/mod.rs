// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Order submission lives here, independent of the web layer and of any
// concrete store or bus backend.
//
// ============================================================================

pub mod order;
