use chrono::{DateTime, Utc};

use crate::domain::order::{AppStatus, HistoryEntry, MessageStatus, Order, OrderError};
use crate::engine::template::MessageKind;
use crate::messaging::SendReceipt;

// ============================================================================
// Order Lifecycle Mutator
// ============================================================================
//
// The only place where send results, validation failures and manual
// overrides are written back onto an order. Every path appends a history
// entry, so the audit trail stays a complete narrative of what the system
// attempted - successes and failures alike.
//
// ============================================================================

/// Audit label for a notification kind.
fn history_kind(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::NewOrderInitial => "Store: Initial Order Notification",
        MessageKind::ConfirmationReminder => "Store: Confirmation Reminder",
        MessageKind::ProcessingConfirmed => "Store: Order Confirmed (Processing)",
        MessageKind::DispatchNotification => "Store: Dispatch Notification",
        MessageKind::CancellationNotice => "Store: Cancellation Alert",
        MessageKind::ShipmentPickedUp => "Courier: Shipment Picked Up",
        MessageKind::InTransitUpdate => "Courier: In Transit Update",
        MessageKind::OutForDelivery => "Courier: Out for Delivery",
        MessageKind::AddressNeeded => "Courier: Address Needed",
        MessageKind::PremisesClosed => "Courier: Premises Closed",
        MessageKind::DeliveredThankYou => "Courier: Delivered - Thank You",
        MessageKind::GenericCourierUpdate => "Courier: Status Update",
        MessageKind::ManualStatusChange => "Store: Manual Status Change",
    }
}

/// Commit the outcome of a send attempt.
///
/// On success the per-intent transition table advances messageStatus (and,
/// for dispatch, appStatus) and arms the one-shot dedup flags. On failure
/// only messageStatus moves, to ErrorSendingFailed; the next selection pass
/// re-offers the same intent.
pub fn apply_notification_result(
    order: &mut Order,
    kind: MessageKind,
    rendered_text: &str,
    receipt: &SendReceipt,
    actor: &str,
    now: DateTime<Utc>,
) {
    if !receipt.succeeded {
        order.message_status = MessageStatus::ErrorSendingFailed;
        order.record_history(HistoryEntry::new(
            now,
            format!("{} - Send Failed", history_kind(kind)),
            &format!("Message sending failed: {}", receipt.provider_response),
            actor,
        ));
        return;
    }

    order.message_status = match kind {
        MessageKind::NewOrderInitial
        | MessageKind::ProcessingConfirmed
        | MessageKind::CancellationNotice => MessageStatus::Sent,
        MessageKind::ConfirmationReminder => MessageStatus::ConfirmationSent,
        MessageKind::DispatchNotification => {
            order.app_status = AppStatus::Dispatched;
            MessageStatus::Sent
        }
        MessageKind::OutForDelivery => {
            order.out_for_delivery_notified = true;
            MessageStatus::Notified
        }
        MessageKind::AddressNeeded | MessageKind::PremisesClosed => {
            order.address_issue_notified = true;
            MessageStatus::Notified
        }
        MessageKind::ShipmentPickedUp
        | MessageKind::InTransitUpdate
        | MessageKind::GenericCourierUpdate
        | MessageKind::DeliveredThankYou
        | MessageKind::ManualStatusChange => MessageStatus::Notified,
    };
    order.message_sent_timestamp = Some(now);
    order.record_history(HistoryEntry::new(now, history_kind(kind), rendered_text, actor));
}

/// Dispatch was requested without a tracking number: terminal validation
/// error, no send attempt.
pub fn record_missing_tracking(order: &mut Order, now: DateTime<Utc>) {
    order.message_status = MessageStatus::ErrorMissingCn;
    order.record_history(HistoryEntry::new(
        now,
        "Store: Dispatch Validation",
        "Dispatch notification attempted, tracking number (CN) missing.",
        "System: Validation",
    ));
}

/// The phone number could not be normalized: terminal validation error,
/// the gateway is never consulted.
pub fn record_invalid_phone(order: &mut Order, kind: MessageKind, now: DateTime<Utc>) {
    order.message_status = MessageStatus::ErrorMissingData;
    order.record_history(HistoryEntry::new(
        now,
        format!("{} - Validation", history_kind(kind)),
        &format!(
            "Cannot send: phone number '{}' is not a valid mobile number.",
            order.customer.phone_number
        ),
        "System: Validation",
    ));
}

/// Customer replied to the confirmation request: move into Processing.
pub fn record_customer_confirmation(
    order: &mut Order,
    now: DateTime<Utc>,
) -> Result<(), OrderError> {
    let awaiting = order.app_status == AppStatus::PendingConfirmation
        && matches!(
            order.message_status,
            MessageStatus::Sent | MessageStatus::ConfirmationSent
        );
    if !awaiting {
        return Err(OrderError::NotAwaitingConfirmation);
    }

    order.app_status = AppStatus::Processing;
    order.message_status = MessageStatus::CustomerConfirmed;
    order.record_history(HistoryEntry::new(
        now,
        "Store: Customer Confirmed",
        "Order confirmed by customer.",
        "User: Confirmation",
    ));
    Ok(())
}

/// Statuses for which a manual override seeds a fresh notification cycle.
const RENOTIFY_STATUSES: [AppStatus; 4] = [
    AppStatus::Dispatched,
    AppStatus::OutForDelivery,
    AppStatus::AddressIssue,
    AppStatus::Cancelled,
];

/// Manual/bulk override: set the application status directly, bypassing
/// intent selection. Archival is one-directional - an archived order
/// refuses every further transition.
pub fn force_transition(
    order: &mut Order,
    new_status: AppStatus,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<(), OrderError> {
    if order.app_status == AppStatus::Archived {
        return Err(OrderError::Archived);
    }

    let old_status = order.app_status;
    order.app_status = new_status;
    order.message_status = if RENOTIFY_STATUSES.contains(&new_status) {
        MessageStatus::Pending
    } else {
        MessageStatus::Notified
    };
    order.record_history(HistoryEntry::new(
        now,
        format!("{}: Status change to {}", actor, new_status),
        &format!("Order status changed from {} to {}.", old_status, new_status),
        actor,
    ));
    Ok(())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::testing;

    #[test]
    fn test_dispatch_success_advances_both_statuses() {
        let mut order = testing::tracked_order("ORD400", "TCS1");
        order.app_status = AppStatus::Processing;

        apply_notification_result(
            &mut order,
            MessageKind::DispatchNotification,
            "rendered dispatch text",
            &SendReceipt::success("ok"),
            "User: Template (ORDER_DISPATCH)",
            Utc::now(),
        );

        assert_eq!(order.app_status, AppStatus::Dispatched);
        assert_eq!(order.message_status, MessageStatus::Sent);
        assert!(order.message_sent_timestamp.is_some());
        assert_eq!(
            order.message_history.last().unwrap().kind,
            "Store: Dispatch Notification"
        );
    }

    #[test]
    fn test_out_for_delivery_success_arms_flag() {
        let mut order = testing::tracked_order("ORD401", "TCS1");
        order.app_status = AppStatus::OutForDelivery;

        apply_notification_result(
            &mut order,
            MessageKind::OutForDelivery,
            "rendered text",
            &SendReceipt::success("ok"),
            "System: Courier Polling",
            Utc::now(),
        );

        assert!(order.out_for_delivery_notified);
        assert_eq!(order.message_status, MessageStatus::Notified);
        // appStatus untouched by courier-side notifications.
        assert_eq!(order.app_status, AppStatus::OutForDelivery);
    }

    #[test]
    fn test_premises_closed_success_arms_address_flag() {
        let mut order = testing::tracked_order("ORD402", "TCS1");
        order.app_status = AppStatus::AddressIssue;

        apply_notification_result(
            &mut order,
            MessageKind::PremisesClosed,
            "rendered text",
            &SendReceipt::success("ok"),
            "System: Courier Polling",
            Utc::now(),
        );

        assert!(order.address_issue_notified);
        assert_eq!(order.message_status, MessageStatus::Notified);
    }

    #[test]
    fn test_reminder_success_moves_to_confirmation_sent() {
        let mut order = testing::order("ORD403");
        order.message_status = MessageStatus::Sent;

        apply_notification_result(
            &mut order,
            MessageKind::ConfirmationReminder,
            "reminder text",
            &SendReceipt::success("ok"),
            "System: Auto Reminder",
            Utc::now(),
        );

        assert_eq!(order.message_status, MessageStatus::ConfirmationSent);
        assert_eq!(order.app_status, AppStatus::PendingConfirmation);
    }

    #[test]
    fn test_failure_records_reason_and_keeps_app_status() {
        let mut order = testing::order("ORD404");
        let before = order.app_status;

        apply_notification_result(
            &mut order,
            MessageKind::NewOrderInitial,
            "rendered text",
            &SendReceipt::failure("provider timeout"),
            "User: Template (NEW_ORDER_INITIAL)",
            Utc::now(),
        );

        assert_eq!(order.app_status, before);
        assert_eq!(order.message_status, MessageStatus::ErrorSendingFailed);
        let entry = order.message_history.last().unwrap();
        assert!(entry.content_snippet.contains("provider timeout"));
    }

    #[test]
    fn test_missing_tracking_is_recorded() {
        let mut order = testing::order("ORD405");
        order.app_status = AppStatus::Dispatched;
        let history_before = order.message_history.len();

        record_missing_tracking(&mut order, Utc::now());

        assert_eq!(order.message_status, MessageStatus::ErrorMissingCn);
        assert_eq!(order.message_history.len(), history_before + 1);
        assert_eq!(order.message_history.last().unwrap().actor, "System: Validation");
    }

    #[test]
    fn test_invalid_phone_is_recorded() {
        let mut order = testing::order("ORD406");
        order.customer.phone_number = "12345".to_string();

        record_invalid_phone(&mut order, MessageKind::NewOrderInitial, Utc::now());

        assert_eq!(order.message_status, MessageStatus::ErrorMissingData);
        assert!(order
            .message_history
            .last()
            .unwrap()
            .content_snippet
            .contains("12345"));
    }

    #[test]
    fn test_customer_confirmation_transitions_to_processing() {
        let mut order = testing::order("ORD407");
        order.message_status = MessageStatus::ConfirmationSent;

        record_customer_confirmation(&mut order, Utc::now()).unwrap();

        assert_eq!(order.app_status, AppStatus::Processing);
        assert_eq!(order.message_status, MessageStatus::CustomerConfirmed);
    }

    #[test]
    fn test_customer_confirmation_rejected_when_not_awaiting() {
        let mut order = testing::order("ORD408");
        order.app_status = AppStatus::Dispatched;

        let result = record_customer_confirmation(&mut order, Utc::now());
        assert!(matches!(result, Err(OrderError::NotAwaitingConfirmation)));
    }

    #[test]
    fn test_force_transition_seeds_notification_cycle() {
        let mut order = testing::order("ORD409");
        order.message_status = MessageStatus::Notified;

        force_transition(&mut order, AppStatus::Dispatched, "User: Bulk Dispatch", Utc::now())
            .unwrap();

        assert_eq!(order.app_status, AppStatus::Dispatched);
        assert_eq!(order.message_status, MessageStatus::Pending);
        let entry = order.message_history.last().unwrap();
        assert!(entry.content_snippet.contains("Pending Confirmation"));
        assert!(entry.content_snippet.contains("Dispatched"));
    }

    #[test]
    fn test_force_transition_to_archive_marks_notified() {
        let mut order = testing::order("ORD410");

        force_transition(&mut order, AppStatus::Archived, "User: Bulk Archive", Utc::now())
            .unwrap();

        assert_eq!(order.app_status, AppStatus::Archived);
        assert_eq!(order.message_status, MessageStatus::Notified);
    }

    #[test]
    fn test_archived_orders_refuse_all_transitions() {
        let mut order = testing::order("ORD411");
        force_transition(&mut order, AppStatus::Archived, "User: Bulk Archive", Utc::now())
            .unwrap();
        let history_before = order.message_history.clone();

        let result =
            force_transition(&mut order, AppStatus::Processing, "User: Change Status", Utc::now());

        assert!(matches!(result, Err(OrderError::Archived)));
        assert_eq!(order.app_status, AppStatus::Archived);
        // Refused transitions leave the audit trail untouched.
        assert_eq!(order.message_history, history_before);
    }

    #[test]
    fn test_history_only_grows_and_existing_entries_are_untouched() {
        let mut order = testing::tracked_order("ORD412", "TCS1");
        order.app_status = AppStatus::Processing;
        let mut previous = order.message_history.clone();

        let operations: Vec<Box<dyn Fn(&mut Order)>> = vec![
            Box::new(|o| {
                apply_notification_result(
                    o,
                    MessageKind::ProcessingConfirmed,
                    "text",
                    &SendReceipt::success("ok"),
                    "User: Template",
                    Utc::now(),
                )
            }),
            Box::new(|o| {
                apply_notification_result(
                    o,
                    MessageKind::DispatchNotification,
                    "text",
                    &SendReceipt::failure("down"),
                    "User: Template",
                    Utc::now(),
                )
            }),
            Box::new(|o| record_missing_tracking(o, Utc::now())),
            Box::new(|o| {
                force_transition(o, AppStatus::Cancelled, "User: Change Status", Utc::now())
                    .unwrap()
            }),
        ];

        for operation in operations {
            operation(&mut order);
            assert!(order.message_history.len() > previous.len());
            assert_eq!(&order.message_history[..previous.len()], &previous[..]);
            previous = order.message_history.clone();
        }
    }
}
