use chrono::{Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::domain::order::{AppStatus, MessageStatus, Order, OrderError};
use crate::messaging::{NotificationSender, SendReceipt};
use crate::metrics::Metrics;
use crate::repository::OrderRepository;
use crate::settings::AppSettings;

pub mod classify;
pub mod lifecycle;
pub mod phone;
pub mod placeholder;
pub mod reconciler;
pub mod selector;
pub mod template;

use reconciler::{ReconcileOutcome, Reconciler};
use selector::Selection;
use template::{MessageKind, TemplateStore};

// ============================================================================
// Notification Engine - Orchestration Service
// ============================================================================
//
// Ties the pieces together: selection, template rendering, sending and the
// lifecycle write-back, plus the courier poll and reminder scan loops the
// infrastructure actors drive on their intervals.
//
// Every operation on an order runs as a read-modify-write under that
// order's own lock, so a poll-triggered reconciliation and a user-triggered
// send on the same order never interleave. Orders are independent of each
// other.
//
// ============================================================================

const REMINDER_ACTOR: &str = "System: Auto Reminder";

/// Outcome of driving one order through selection and (maybe) a send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Sent(MessageKind),
    SendFailed(MessageKind),
    /// Dispatch intent without a tracking number; recorded, nothing sent.
    MissingTrackingNumber,
    /// Phone number rejected before the gateway was consulted.
    InvalidPhoneNumber(MessageKind),
    NothingPending,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PollSummary {
    pub orders_polled: usize,
    pub events_applied: usize,
    pub notifications_sent: usize,
}

#[derive(Debug, Default, Clone)]
pub struct BulkTransitionSummary {
    pub updated: Vec<String>,
    pub skipped: Vec<String>,
}

/// Per-order mutual exclusion. Locks are created lazily and live for the
/// process lifetime; the set of order ids is small.
#[derive(Default)]
struct OrderLocks {
    inner: std::sync::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl OrderLocks {
    async fn acquire(&self, order_id: &str) -> tokio::sync::OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.inner.lock().expect("order lock registry poisoned");
            locks.entry(order_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

/// Short-lived marker for orders that are mid-notification, so the reminder
/// scan does not double-fire against an order already being handled.
#[derive(Default, Clone)]
struct InFlightSet {
    inner: Arc<std::sync::Mutex<HashSet<String>>>,
}

struct InFlightGuard {
    set: InFlightSet,
    order_id: String,
}

impl InFlightSet {
    fn mark(&self, order_id: &str) -> InFlightGuard {
        self.inner
            .lock()
            .expect("in-flight set poisoned")
            .insert(order_id.to_string());
        InFlightGuard {
            set: self.clone(),
            order_id: order_id.to_string(),
        }
    }

    fn contains(&self, order_id: &str) -> bool {
        self.inner
            .lock()
            .expect("in-flight set poisoned")
            .contains(order_id)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set
            .inner
            .lock()
            .expect("in-flight set poisoned")
            .remove(&self.order_id);
    }
}

pub struct NotificationEngine {
    repository: Arc<dyn OrderRepository>,
    sender: Arc<dyn NotificationSender>,
    reconciler: Reconciler,
    templates: Arc<TemplateStore>,
    settings: AppSettings,
    metrics: Arc<Metrics>,
    locks: OrderLocks,
    in_flight: InFlightSet,
}

impl NotificationEngine {
    pub fn new(
        repository: Arc<dyn OrderRepository>,
        courier_source: Arc<dyn crate::courier::CourierStatusSource>,
        sender: Arc<dyn NotificationSender>,
        templates: Arc<TemplateStore>,
        settings: AppSettings,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            repository,
            sender,
            reconciler: Reconciler::new(courier_source),
            templates,
            settings,
            metrics,
            locks: OrderLocks::default(),
            in_flight: InFlightSet::default(),
        }
    }

    /// Read-only probe: what, if anything, is due for this order right now?
    /// Safe to call repeatedly; never mutates the order.
    pub async fn probe(&self, order_id: &str) -> anyhow::Result<Selection> {
        let order = self.load(order_id).await?;
        Ok(selector::select_intent(&order))
    }

    /// Drive one order through selection, rendering, sending and write-back.
    pub async fn process(&self, order_id: &str, actor: &str) -> anyhow::Result<ProcessOutcome> {
        let _guard = self.locks.acquire(order_id).await;
        let _marker = self.in_flight.mark(order_id);

        let mut order = self.load(order_id).await?;
        let outcome = self.process_locked(&mut order, actor).await;
        self.repository.save(order).await?;
        Ok(outcome)
    }

    /// Explicit operator notification after a manual status change. Sits
    /// outside the automatic decision table on purpose: the operator chose
    /// to tell the customer, whatever the selector thinks is due.
    pub async fn send_manual_status_notice(
        &self,
        order_id: &str,
        actor: &str,
    ) -> anyhow::Result<ProcessOutcome> {
        let _guard = self.locks.acquire(order_id).await;
        let _marker = self.in_flight.mark(order_id);

        let mut order = self.load(order_id).await?;
        let outcome = self
            .send_kind(&mut order, MessageKind::ManualStatusChange, actor)
            .await;
        self.repository.save(order).await?;
        Ok(outcome)
    }

    /// Selection + send on an already-locked, already-loaded order.
    /// The caller persists the order afterwards.
    async fn process_locked(&self, order: &mut Order, actor: &str) -> ProcessOutcome {
        let now = Utc::now();

        let kind = match selector::select_intent(order) {
            Selection::Nothing => {
                tracing::debug!(order_id = %order.id, "Nothing pending");
                return ProcessOutcome::NothingPending;
            }
            Selection::MissingTrackingNumber => {
                tracing::warn!(order_id = %order.id, "Dispatch requested without tracking number");
                lifecycle::record_missing_tracking(order, now);
                self.metrics.validation_failures.with_label_values(&["missing_cn"]).inc();
                return ProcessOutcome::MissingTrackingNumber;
            }
            Selection::Due(kind) => kind,
        };

        self.send_kind(order, kind, actor).await
    }

    /// Render and send one notification kind, then commit the outcome onto
    /// the order.
    async fn send_kind(&self, order: &mut Order, kind: MessageKind, actor: &str) -> ProcessOutcome {
        let now = Utc::now();
        let resolved = self.templates.resolve(kind);
        let text = placeholder::render(&resolved.template, order, &self.settings);

        let Some(recipient) = phone::normalize(&order.customer.phone_number) else {
            tracing::warn!(
                order_id = %order.id,
                phone = %order.customer.phone_number,
                "Phone number rejected, message not sent"
            );
            lifecycle::record_invalid_phone(order, kind, now);
            self.metrics.validation_failures.with_label_values(&["invalid_phone"]).inc();
            return ProcessOutcome::InvalidPhoneNumber(kind);
        };

        // Bounded send: a hung provider call becomes an ordinary failure.
        let receipt =
            match tokio::time::timeout(self.settings.send_timeout(), self.sender.send(&recipient, &text))
                .await
            {
                Ok(receipt) => receipt,
                Err(_) => SendReceipt::failure(format!(
                    "send timed out after {}s",
                    self.settings.send_timeout_seconds
                )),
            };

        let succeeded = receipt.succeeded;
        lifecycle::apply_notification_result(order, kind, &text, &receipt, actor, now);

        if succeeded {
            tracing::info!(order_id = %order.id, kind = %kind, "Notification sent");
            self.metrics.notifications_sent.with_label_values(&[kind.key()]).inc();
            ProcessOutcome::Sent(kind)
        } else {
            tracing::warn!(
                order_id = %order.id,
                kind = %kind,
                reason = %receipt.provider_response,
                "Notification send failed"
            );
            self.metrics.notifications_failed.with_label_values(&[kind.key()]).inc();
            ProcessOutcome::SendFailed(kind)
        }
    }

    /// One courier poll pass over every trackable, non-terminal order.
    /// Each order reconciles and, when its application status moved,
    /// notifies - all under that order's lock.
    pub async fn poll_tracked_orders(&self) -> anyhow::Result<PollSummary> {
        let mut summary = PollSummary::default();

        let candidates: Vec<String> = self
            .repository
            .list_active()
            .await?
            .into_iter()
            .filter(Order::is_trackable)
            .map(|o| o.id)
            .collect();

        for order_id in candidates {
            let _guard = self.locks.acquire(&order_id).await;
            let _marker = self.in_flight.mark(&order_id);

            let Some(mut order) = self.repository.get(&order_id).await? else {
                continue;
            };
            if !order.is_trackable() {
                // Raced with a manual transition since listing; leave it be.
                continue;
            }

            summary.orders_polled += 1;
            self.metrics.courier_polls.inc();

            match self.reconciler.reconcile(&mut order, Utc::now()).await {
                Err(error) => {
                    // Source trouble on one order must not stall the sweep.
                    tracing::warn!(order_id = %order_id, error = %error, "Courier poll failed");
                    continue;
                }
                Ok(ReconcileOutcome::NotTracked) | Ok(ReconcileOutcome::UpToDate) => {
                    self.repository.save(order).await?;
                }
                Ok(ReconcileOutcome::Advanced { app_status_changed }) => {
                    summary.events_applied += 1;
                    self.metrics.courier_events_applied.inc();

                    if app_status_changed {
                        let outcome = self.process_locked(&mut order, reconciler::POLL_ACTOR).await;
                        if matches!(outcome, ProcessOutcome::Sent(_)) {
                            summary.notifications_sent += 1;
                        }
                    }
                    self.repository.save(order).await?;
                }
            }
        }

        Ok(summary)
    }

    /// Confirmation-reminder sweep, independent of the courier poll cadence.
    /// Skips orders already mid-notification.
    pub async fn run_reminder_scan(&self) -> anyhow::Result<usize> {
        let now = Utc::now();
        let delay = Duration::hours(self.settings.confirmation_delay_hours as i64);

        let due: Vec<String> = self
            .repository
            .list_active()
            .await?
            .into_iter()
            .filter(|o| {
                o.app_status == AppStatus::PendingConfirmation
                    && o.message_status == MessageStatus::Sent
                    && o.message_sent_timestamp
                        .map(|sent| now - sent >= delay)
                        .unwrap_or(false)
                    && !self.in_flight.contains(&o.id)
            })
            .map(|o| o.id)
            .collect();

        let mut sent = 0;
        for order_id in due {
            match self.process(&order_id, REMINDER_ACTOR).await {
                Ok(ProcessOutcome::Sent(MessageKind::ConfirmationReminder)) => {
                    sent += 1;
                    self.metrics.reminders_sent.inc();
                }
                Ok(other) => {
                    tracing::debug!(order_id = %order_id, outcome = ?other, "Reminder scan outcome");
                }
                Err(error) => {
                    tracing::warn!(order_id = %order_id, error = %error, "Reminder processing failed");
                }
            }
        }
        Ok(sent)
    }

    /// Manual/bulk override path. Archived orders are reported back as
    /// skipped rather than failing the whole batch.
    pub async fn force_transition(
        &self,
        order_ids: &[String],
        new_status: AppStatus,
        actor: &str,
    ) -> anyhow::Result<BulkTransitionSummary> {
        let mut summary = BulkTransitionSummary::default();

        for order_id in order_ids {
            let _guard = self.locks.acquire(order_id).await;

            let Some(mut order) = self.repository.get(order_id).await? else {
                summary.skipped.push(order_id.clone());
                continue;
            };

            match lifecycle::force_transition(&mut order, new_status, actor, Utc::now()) {
                Ok(()) => {
                    self.repository.save(order).await?;
                    summary.updated.push(order_id.clone());
                }
                Err(OrderError::Archived) => {
                    tracing::debug!(order_id = %order_id, "Archived order skipped in bulk transition");
                    summary.skipped.push(order_id.clone());
                }
                Err(error) => return Err(error.into()),
            }
        }

        tracing::info!(
            new_status = %new_status,
            updated = summary.updated.len(),
            skipped = summary.skipped.len(),
            actor = %actor,
            "Bulk status transition applied"
        );
        Ok(summary)
    }

    /// Store-side entry point for a customer confirming their order.
    pub async fn record_customer_confirmation(&self, order_id: &str) -> anyhow::Result<()> {
        let _guard = self.locks.acquire(order_id).await;
        let mut order = self.load(order_id).await?;
        lifecycle::record_customer_confirmation(&mut order, Utc::now())?;
        self.repository.save(order).await?;
        Ok(())
    }

    async fn load(&self, order_id: &str) -> anyhow::Result<Order> {
        self.repository
            .get(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()).into())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
