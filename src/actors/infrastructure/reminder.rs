use actix::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use crate::actors::core::{ActorMetadata, HealthStatus, SupervisedActor, SupervisionStrategy};
use crate::actors::infrastructure::health_monitor::{HealthMonitorActor, UpdateHealth};
use crate::engine::NotificationEngine;

// ============================================================================
// Reminder Actor
// ============================================================================
//
// Runs the confirmation-reminder scan on its own cadence, independent of
// the courier poll interval. The engine skips orders that are already
// mid-notification, so a scan never double-fires.
//
// ============================================================================

pub struct ReminderActor {
    engine: Arc<NotificationEngine>,
    interval: Duration,
    health: Addr<HealthMonitorActor>,
}

impl ReminderActor {
    pub fn new(
        engine: Arc<NotificationEngine>,
        interval: Duration,
        health: Addr<HealthMonitorActor>,
    ) -> Self {
        Self {
            engine,
            interval,
            health,
        }
    }
}

impl Actor for ReminderActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(interval_secs = self.interval.as_secs(), "ReminderActor started");

        ctx.run_interval(self.interval, |act, _ctx| {
            let engine = act.engine.clone();
            let health = act.health.clone();

            actix::spawn(async move {
                match engine.run_reminder_scan().await {
                    Ok(sent) => {
                        if sent > 0 {
                            tracing::info!(reminders = sent, "Confirmation reminders sent");
                        }
                        health.do_send(UpdateHealth {
                            component: "reminder_scan",
                            status: HealthStatus::Healthy,
                            details: Some(format!("sent {} reminders", sent)),
                        });
                    }
                    Err(error) => {
                        tracing::error!(error = %error, "Reminder scan failed");
                        health.do_send(UpdateHealth {
                            component: "reminder_scan",
                            status: HealthStatus::Unhealthy(error.to_string()),
                            details: None,
                        });
                    }
                }
            });
        });
    }
}

impl SupervisedActor for ReminderActor {
    fn metadata() -> ActorMetadata {
        ActorMetadata {
            name: "reminder_scan",
            description: "Sends confirmation reminders after the configured delay",
            strategy: SupervisionStrategy::Restart,
        }
    }
}
