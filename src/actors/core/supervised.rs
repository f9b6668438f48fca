use actix::prelude::*;

// ============================================================================
// Supervised Actor Trait
// ============================================================================
//
// Common interface for actors managed by the coordinator. Supplies the
// metadata the coordinator logs and the strategy it applies on failure.
//
// ============================================================================

/// Supervision strategy for an actor
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SupervisionStrategy {
    /// Restart actor on failure
    Restart,
    /// Stop actor permanently on failure
    Stop,
}

/// Metadata about a supervised actor
pub struct ActorMetadata {
    pub name: &'static str,
    pub description: &'static str,
    pub strategy: SupervisionStrategy,
}

/// Trait for actors that can be supervised by the coordinator
pub trait SupervisedActor: Actor {
    fn metadata() -> ActorMetadata;
}
