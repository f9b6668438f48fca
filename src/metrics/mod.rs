// Private module declaration
mod server;

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Counters for:
// - Courier polling (polls run, events applied)
// - Notifications (sent / failed, labeled by message kind)
// - Validation short-circuits (missing CN, invalid phone)
// - Confirmation reminders
//
// All metrics are registered with a local Registry and scraped via /metrics.
//
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Courier polling
    pub courier_polls: IntCounter,
    pub courier_events_applied: IntCounter,

    // Notifications
    pub notifications_sent: IntCounterVec,
    pub notifications_failed: IntCounterVec,

    // Validation failures that stopped a send before the gateway
    pub validation_failures: IntCounterVec,

    // Confirmation reminders
    pub reminders_sent: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let courier_polls = IntCounter::new(
            "courier_polls_total",
            "Orders examined by the courier poll loop",
        )?;
        registry.register(Box::new(courier_polls.clone()))?;

        let courier_events_applied = IntCounter::new(
            "courier_events_applied_total",
            "Courier status events appended to order histories",
        )?;
        registry.register(Box::new(courier_events_applied.clone()))?;

        let notifications_sent = IntCounterVec::new(
            Opts::new("notifications_sent_total", "Notifications sent successfully"),
            &["kind"],
        )?;
        registry.register(Box::new(notifications_sent.clone()))?;

        let notifications_failed = IntCounterVec::new(
            Opts::new("notifications_failed_total", "Notification sends that failed"),
            &["kind"],
        )?;
        registry.register(Box::new(notifications_failed.clone()))?;

        let validation_failures = IntCounterVec::new(
            Opts::new(
                "validation_failures_total",
                "Sends stopped by validation before reaching the gateway",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(validation_failures.clone()))?;

        let reminders_sent = IntCounter::new(
            "confirmation_reminders_sent_total",
            "Confirmation reminders sent by the reminder scan",
        )?;
        registry.register(Box::new(reminders_sent.clone()))?;

        Ok(Self {
            registry,
            courier_polls,
            courier_events_applied,
            notifications_sent,
            notifications_failed,
            validation_failures,
            reminders_sent,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{Encoder, TextEncoder};

    #[test]
    fn test_metrics_register_and_encode() {
        let metrics = Metrics::new().unwrap();
        metrics.courier_polls.inc();
        metrics
            .notifications_sent
            .with_label_values(&["ORDER_DISPATCH"])
            .inc();

        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&metrics.registry().gather(), &mut buffer)
            .unwrap();
        let exposition = String::from_utf8(buffer).unwrap();

        assert!(exposition.contains("courier_polls_total 1"));
        assert!(exposition.contains("notifications_sent_total{kind=\"ORDER_DISPATCH\"} 1"));
    }
}
