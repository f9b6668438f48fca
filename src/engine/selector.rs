use crate::domain::order::{AppStatus, MessageStatus, Order};
use crate::engine::classify;
use crate::engine::template::MessageKind;

// ============================================================================
// Notification Intent Selector
// ============================================================================
//
// The decision table at the heart of the engine: given an order snapshot,
// return the single pending notification intent, or nothing. Evaluated
// top-to-bottom, first match wins.
//
// This function is pure. It never mutates the order - even the
// missing-tracking-number outcome is only reported here and recorded by the
// lifecycle mutator - so operators can probe an order repeatedly without
// side effects.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// A notification of this kind is due now.
    Due(MessageKind),
    /// Dispatch notification requested but the order has no tracking number.
    /// Hard validation failure: no send attempt may be made.
    MissingTrackingNumber,
    /// No rule matched; nothing is pending for this order.
    Nothing,
}

/// A failed send keeps the order eligible for the same intent: the failure
/// is on the audit trail, and the next probe re-offers the notification.
fn awaiting_notification(status: MessageStatus) -> bool {
    matches!(
        status,
        MessageStatus::Pending | MessageStatus::ErrorSendingFailed
    )
}

pub fn select_intent(order: &Order) -> Selection {
    let status = order.app_status;
    let message = order.message_status;
    let latest = order.latest_courier_status.as_deref().unwrap_or("");

    if status == AppStatus::PendingConfirmation && awaiting_notification(message) {
        return Selection::Due(MessageKind::NewOrderInitial);
    }

    if status == AppStatus::PendingConfirmation && message == MessageStatus::Sent {
        return Selection::Due(MessageKind::ConfirmationReminder);
    }

    if status == AppStatus::Processing
        && (awaiting_notification(message) || message == MessageStatus::CustomerConfirmed)
    {
        return Selection::Due(MessageKind::ProcessingConfirmed);
    }

    if status == AppStatus::Dispatched && awaiting_notification(message) {
        if order.tracking_number.is_none() {
            return Selection::MissingTrackingNumber;
        }
        return Selection::Due(MessageKind::DispatchNotification);
    }

    if status == AppStatus::OutForDelivery && !order.out_for_delivery_notified {
        return Selection::Due(MessageKind::OutForDelivery);
    }

    if status == AppStatus::AddressIssue && !order.address_issue_notified {
        // One appStatus, two customer messages: the courier text decides.
        if classify::is_premises_closed(latest) {
            return Selection::Due(MessageKind::PremisesClosed);
        }
        return Selection::Due(MessageKind::AddressNeeded);
    }

    if status == AppStatus::Delivered
        && !matches!(
            message,
            MessageStatus::Notified | MessageStatus::CustomerConfirmed
        )
    {
        return Selection::Due(MessageKind::DeliveredThankYou);
    }

    if status == AppStatus::Cancelled && awaiting_notification(message) {
        return Selection::Due(MessageKind::CancellationNotice);
    }

    if order.tracking_number.is_some()
        && matches!(status, AppStatus::Dispatched | AppStatus::InTransit)
        && awaiting_notification(message)
    {
        if classify::is_picked_up(latest) {
            return Selection::Due(MessageKind::ShipmentPickedUp);
        }
        if status == AppStatus::InTransit {
            return Selection::Due(MessageKind::InTransitUpdate);
        }
        return Selection::Due(MessageKind::GenericCourierUpdate);
    }

    Selection::Nothing
}

// ============================================================================
// Unit Tests
// ============================================================================
