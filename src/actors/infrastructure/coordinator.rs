use actix::prelude::*;
use std::sync::Arc;

use crate::actors::core::{HealthStatus, SupervisedActor};
use crate::actors::infrastructure::courier_poller::CourierPollActor;
use crate::actors::infrastructure::health_monitor::{GetSystemHealth, HealthMonitorActor};
use crate::actors::infrastructure::reminder::ReminderActor;
use crate::engine::NotificationEngine;
use crate::settings::AppSettings;

// ============================================================================
// Coordinator Actor - Orchestrates all system actors
// ============================================================================
//
// Responsibilities:
// - Manages lifecycle of child actors (poller, reminder, health monitor)
// - Reports system health periodically
//
// Actor Hierarchy:
//   CoordinatorActor (Supervisor)
//   ├── HealthMonitorActor
//   ├── CourierPollActor
//   └── ReminderActor
//
// ============================================================================

const HEALTH_LOG_INTERVAL: std::time::Duration = std::time::Duration::from_secs(30);

pub struct CoordinatorActor {
    engine: Arc<NotificationEngine>,
    settings: AppSettings,
    health_monitor: Option<Addr<HealthMonitorActor>>,
    // Retained so the children keep a connected mailbox for the process
    // lifetime.
    #[allow(dead_code)]
    courier_poller: Option<Addr<CourierPollActor>>,
    #[allow(dead_code)]
    reminder: Option<Addr<ReminderActor>>,
}

impl CoordinatorActor {
    pub fn new(engine: Arc<NotificationEngine>, settings: AppSettings) -> Self {
        Self {
            engine,
            settings,
            health_monitor: None,
            courier_poller: None,
            reminder: None,
        }
    }

    fn start_child_actors(&mut self) {
        tracing::info!("Starting supervised child actors");

        let health = HealthMonitorActor::new().start();
        self.health_monitor = Some(health.clone());
        log_child_start::<HealthMonitorActor>();

        let poller = CourierPollActor::new(
            self.engine.clone(),
            self.settings.polling_interval(),
            health.clone(),
        )
        .start();
        self.courier_poller = Some(poller);
        log_child_start::<CourierPollActor>();

        let reminder = ReminderActor::new(
            self.engine.clone(),
            self.settings.reminder_scan_interval(),
            health,
        )
        .start();
        self.reminder = Some(reminder);
        log_child_start::<ReminderActor>();

        tracing::info!("All supervised actors started");
    }
}

fn log_child_start<A: SupervisedActor>() {
    let metadata = A::metadata();
    tracing::info!(
        actor = metadata.name,
        strategy = ?metadata.strategy,
        "{}",
        metadata.description
    );
}

impl Actor for CoordinatorActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("CoordinatorActor started");
        self.start_child_actors();

        // Periodic system-health summary in the logs.
        ctx.run_interval(HEALTH_LOG_INTERVAL, |act, _ctx| {
            if let Some(health) = act.health_monitor.clone() {
                actix::spawn(async move {
                    match health.send(GetSystemHealth).await {
                        Ok(system) => match system.overall_status {
                            HealthStatus::Healthy => {
                                tracing::debug!(at = %system.check_time, "System health check: healthy");
                            }
                            HealthStatus::Degraded(ref msg) => {
                                tracing::warn!("System health check: degraded - {}", msg);
                            }
                            HealthStatus::Unhealthy(ref msg) => {
                                tracing::error!("System health check: unhealthy - {}", msg);
                            }
                        },
                        Err(error) => {
                            tracing::error!(error = %error, "Health monitor unreachable");
                        }
                    }
                });
            }
        });
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("CoordinatorActor stopped");
    }
}
