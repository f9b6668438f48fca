use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Order Value Objects
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
}

/// Consolidated application status of an order as shown on the dashboard.
///
/// Delivered, Cancelled and Archived are terminal: no automatic transition
/// leaves them. Archived is reachable from any non-terminal status via the
/// bulk override path only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppStatus {
    PendingConfirmation,
    Processing,
    Dispatched,
    InTransit,
    OutForDelivery,
    AddressIssue,
    Delivered,
    Cancelled,
    Archived,
}

impl AppStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppStatus::Delivered | AppStatus::Cancelled | AppStatus::Archived
        )
    }
}

impl fmt::Display for AppStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AppStatus::PendingConfirmation => "Pending Confirmation",
            AppStatus::Processing => "Processing",
            AppStatus::Dispatched => "Dispatched",
            AppStatus::InTransit => "In Transit",
            AppStatus::OutForDelivery => "Out for Delivery",
            AppStatus::AddressIssue => "Address Issue",
            AppStatus::Delivered => "Delivered",
            AppStatus::Cancelled => "Cancelled",
            AppStatus::Archived => "Archived",
        };
        f.write_str(label)
    }
}

/// Notification-side status, tracked independently of AppStatus.
///
/// A fresh AppStatus transition resets the expectation that a new
/// notification is due; the engine models that by putting the order back
/// into Pending where a new notification cycle should start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageStatus {
    Pending,
    Sent,
    ConfirmationSent,
    CustomerConfirmed,
    Notified,
    ErrorMissingData,
    ErrorSendingFailed,
    ErrorMissingCn,
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MessageStatus::Pending => "Pending",
            MessageStatus::Sent => "Sent",
            MessageStatus::ConfirmationSent => "Confirmation Sent",
            MessageStatus::CustomerConfirmed => "Customer Confirmed",
            MessageStatus::Notified => "Notified",
            MessageStatus::ErrorMissingData => "Error: Missing Data",
            MessageStatus::ErrorSendingFailed => "Error: Sending Failed",
            MessageStatus::ErrorMissingCn => "Error: Missing CN",
        };
        f.write_str(label)
    }
}

/// One tracking event as reported by the courier. The courier history on an
/// order is an append-only sequence of these; entries are never rewritten.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CourierEvent {
    pub timestamp: DateTime<Utc>,
    pub status_text: String,
}

impl CourierEvent {
    pub fn new(timestamp: DateTime<Utc>, status_text: impl Into<String>) -> Self {
        Self {
            timestamp,
            status_text: status_text.into(),
        }
    }
}

/// Immutable audit record of an action taken on an order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    /// e.g. "Store: Dispatch Notification", "TCS: Status Polled - Booked"
    pub kind: String,
    pub content_snippet: String,
    /// e.g. "System: Courier Polling", "User: Bulk Archive"
    pub actor: String,
}

const SNIPPET_LIMIT: usize = 100;

impl HistoryEntry {
    /// Snippets are bounded so the audit trail stays scannable even when the
    /// rendered message is long.
    pub fn new(
        timestamp: DateTime<Utc>,
        kind: impl Into<String>,
        content: &str,
        actor: impl Into<String>,
    ) -> Self {
        let snippet = if content.chars().count() > SNIPPET_LIMIT {
            let head: String = content.chars().take(SNIPPET_LIMIT).collect();
            format!("{}...", head)
        } else {
            content.to_string()
        };
        Self {
            timestamp,
            kind: kind.into(),
            content_snippet: snippet,
            actor: actor.into(),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
