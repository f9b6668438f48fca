// ============================================================================
// Actors Module
// ============================================================================
//
// Actor-based infrastructure for the periodic, concurrent parts of the
// system: courier polling, reminder scanning, health monitoring and the
// coordinator supervising them.
//
// Structure:
// - core/           - Abstract traits and types (health, supervision)
// - infrastructure/ - Concrete infrastructure actors
//
// Note: Domain logic (selection, reconciliation, lifecycle) lives in the
//       engine as plain handlers, NOT in actors. Actors only own cadence
//       and supervision.
//
// ============================================================================

// Private module declarations
mod core;
mod infrastructure;

// Re-export only what's needed in the public API
pub use infrastructure::CoordinatorActor;
