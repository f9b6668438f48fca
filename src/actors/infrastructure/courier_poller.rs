use actix::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use crate::actors::core::{ActorMetadata, HealthStatus, SupervisedActor, SupervisionStrategy};
use crate::actors::infrastructure::health_monitor::{HealthMonitorActor, UpdateHealth};
use crate::engine::NotificationEngine;

// ============================================================================
// Courier Poll Actor
// ============================================================================
//
// Drives the engine's courier sweep on a fixed interval. Each tick iterates
// all trackable, non-terminal orders; reconciliation and any triggered
// notification run inside the engine under per-order locks, so ticks are
// safe to overlap with user-driven sends.
//
// ============================================================================

pub struct CourierPollActor {
    engine: Arc<NotificationEngine>,
    interval: Duration,
    health: Addr<HealthMonitorActor>,
}

impl CourierPollActor {
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

impl Actor for CourierPollActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(interval_secs = self.interval.as_secs(), "CourierPollActor started");

        ctx.run_interval(self.interval, |act, _ctx| {
            let engine = act.engine.clone();
            let health = act.health.clone();

            actix::spawn(async move {
                match engine.poll_tracked_orders().await {
                    Ok(summary) => {
                        tracing::debug!(
                            polled = summary.orders_polled,
                            advanced = summary.events_applied,
                            notified = summary.notifications_sent,
                            "Courier poll sweep finished"
                        );
                        health.do_send(UpdateHealth {
                            component: "courier_poller",
                            status: HealthStatus::Healthy,
                            details: Some(format!(
                                "polled {} orders, applied {} events",
                                summary.orders_polled, summary.events_applied
                            )),
                        });
                    }
                    Err(error) => {
                        tracing::error!(error = %error, "Courier poll sweep failed");
                        health.do_send(UpdateHealth {
                            component: "courier_poller",
                            status: HealthStatus::Unhealthy(error.to_string()),
                            details: None,
                        });
                    }
                }
            });
        });
    }
}

impl SupervisedActor for CourierPollActor {
    fn metadata() -> ActorMetadata {
        ActorMetadata {
            name: "courier_poller",
            description: "Polls the courier status source for tracked orders",
            strategy: SupervisionStrategy::Restart,
        }
    }
}
