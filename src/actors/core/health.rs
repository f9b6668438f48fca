use chrono::{DateTime, Utc};

// ============================================================================
// Health Abstractions
// ============================================================================
//
// Component health as tracked by the health monitor. Each periodic actor
// reports its status after every sweep; the monitor aggregates.
//
// ============================================================================

/// Health status of a component
#[derive(Debug, Clone, PartialEq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// Health information for a component
#[derive(Debug, Clone)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    pub details: Option<String>,
}

impl ComponentHealth {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
            last_check: Utc::now(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_predicates() {
        assert!(HealthStatus::Healthy.is_healthy());
        assert!(!HealthStatus::Degraded("slow".to_string()).is_healthy());
        assert!(!HealthStatus::Unhealthy("down".to_string()).is_healthy());
    }

    #[test]
    fn test_component_health_builder() {
        let health = ComponentHealth::new("courier_poller", HealthStatus::Healthy)
            .with_details("last sweep polled 4 orders");
        assert_eq!(health.name, "courier_poller");
        assert!(health.details.is_some());
    }
}
