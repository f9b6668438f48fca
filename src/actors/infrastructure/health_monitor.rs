use actix::prelude::*;
use chrono::Utc;
use std::collections::HashMap;

use crate::actors::core::{
    ActorMetadata, ComponentHealth, HealthStatus, SupervisedActor, SupervisionStrategy,
};

// ============================================================================
// Health Monitor Actor
// ============================================================================
//
// Tracks health status per component and aggregates system-wide health.
// Periodic actors report in after every sweep; the coordinator asks for the
// aggregate on its own cadence.
//
// ============================================================================

// ============================================================================
// Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "()")]
pub struct UpdateHealth {
    pub component: &'static str,
    pub status: HealthStatus,
    pub details: Option<String>,
}

#[derive(Message)]
#[rtype(result = "SystemHealth")]
pub struct GetSystemHealth;

#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub overall_status: HealthStatus,
    pub components: HashMap<String, ComponentHealth>,
    pub check_time: chrono::DateTime<Utc>,
}

// ============================================================================
// Actor
// ============================================================================

#[derive(Default)]
pub struct HealthMonitorActor {
    components: HashMap<String, ComponentHealth>,
}

impl HealthMonitorActor {
    pub fn new() -> Self {
        Self::default()
    }

    fn compute_overall_status(&self) -> HealthStatus {
        let mut has_degraded = false;
        let mut unhealthy_components = Vec::new();

        for (name, health) in &self.components {
            match &health.status {
                HealthStatus::Unhealthy(msg) => {
                    unhealthy_components.push(format!("{}: {}", name, msg));
                }
                HealthStatus::Degraded(_) => {
                    has_degraded = true;
                }
                HealthStatus::Healthy => {}
            }
        }

        if !unhealthy_components.is_empty() {
            HealthStatus::Unhealthy(unhealthy_components.join(", "))
        } else if has_degraded {
            HealthStatus::Degraded("Some components degraded".to_string())
        } else {
            HealthStatus::Healthy
        }
    }
}

impl Actor for HealthMonitorActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("HealthMonitorActor started");
    }
}

impl SupervisedActor for HealthMonitorActor {
    fn metadata() -> ActorMetadata {
        ActorMetadata {
            name: "health_monitor",
            description: "Aggregates component health reports",
            strategy: SupervisionStrategy::Stop,
        }
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Handler<UpdateHealth> for HealthMonitorActor {
    type Result = ();

    fn handle(&mut self, msg: UpdateHealth, _: &mut Self::Context) {
        if !msg.status.is_healthy() {
            tracing::warn!(component = msg.component, status = ?msg.status, "Component health degraded");
        }

        let mut health = ComponentHealth::new(msg.component, msg.status);
        if let Some(details) = msg.details {
            health = health.with_details(details);
        }
        self.components.insert(msg.component.to_string(), health);
    }
}

impl Handler<GetSystemHealth> for HealthMonitorActor {
    type Result = MessageResult<GetSystemHealth>;

    fn handle(&mut self, _: GetSystemHealth, _: &mut Self::Context) -> Self::Result {
        MessageResult(SystemHealth {
            overall_status: self.compute_overall_status(),
            components: self.components.clone(),
            check_time: Utc::now(),
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
