// ============================================================================
// Infrastructure Actors
// ============================================================================
//
// Concrete actors for system concerns:
// - Courier status polling
// - Confirmation reminder scanning
// - Health monitoring
// - Coordination and supervision
//
// ============================================================================

// Private module declarations
mod coordinator;
mod courier_poller;
mod health_monitor;
mod reminder;

// Re-export for public API
pub use coordinator::CoordinatorActor;
pub use courier_poller::CourierPollActor;
pub use health_monitor::{GetSystemHealth, HealthMonitorActor, SystemHealth, UpdateHealth};
pub use reminder::ReminderActor;
