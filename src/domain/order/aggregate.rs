use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::OrderError;
use super::value_objects::{AppStatus, CourierEvent, HistoryEntry, MessageStatus, OrderItem};

// ============================================================================
// Order Aggregate
// ============================================================================
//
// The aggregate owns its state fields (statuses, flags, histories); the
// customer/shipping fields are owned by the external edit workflow and are
// only read here. Both histories are append-only: entries are added through
// the dedicated methods and never rewritten.
//
// ============================================================================

/// Customer and shipping data captured at order entry. Owned by the edit
/// workflow; the orchestration core never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub customer_name: String,
    pub phone_number: String,
    pub address: String,
    pub city: String,
    pub payment_method: String,
    pub delivery_method: Option<String>,
    pub currency_symbol: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    // Identity
    pub id: String,

    // Customer / shipping (read-only for the core)
    pub customer: CustomerDetails,
    pub order_timestamp: DateTime<Utc>,
    pub items: Vec<OrderItem>,

    // Lifecycle state (owned by the orchestration core)
    pub app_status: AppStatus,
    pub message_status: MessageStatus,
    pub message_sent_timestamp: Option<DateTime<Utc>>,

    // Courier tracking
    pub tracking_number: Option<String>,
    pub courier_history: Vec<CourierEvent>,
    pub latest_courier_status: Option<String>,

    // One-shot notification dedup flags. Never reset for the lifetime of
    // the order, even if the status later regresses and re-enters.
    pub out_for_delivery_notified: bool,
    pub address_issue_notified: bool,

    // Audit trail
    pub message_history: Vec<HistoryEntry>,
}

impl Order {
    /// Create a new order in its initial lifecycle state, with a creation
    /// entry already on the audit trail.
    pub fn create(
        id: impl Into<String>,
        customer: CustomerDetails,
        items: Vec<OrderItem>,
        now: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        Self::validate_items(&items)?;

        let mut order = Self {
            id: id.into(),
            customer,
            order_timestamp: now,
            items,
            app_status: AppStatus::PendingConfirmation,
            message_status: MessageStatus::Pending,
            message_sent_timestamp: None,
            tracking_number: None,
            courier_history: Vec::new(),
            latest_courier_status: None,
            out_for_delivery_notified: false,
            address_issue_notified: false,
            message_history: Vec::new(),
        };
        order.record_history(HistoryEntry::new(
            now,
            "System: Order Created",
            "Order created in system.",
            "User: Create Form",
        ));
        Ok(order)
    }

    fn validate_items(items: &[OrderItem]) -> Result<(), OrderError> {
        if items.is_empty() {
            return Err(OrderError::EmptyItems);
        }
        for item in items {
            if item.quantity == 0 {
                return Err(OrderError::InvalidQuantity(item.quantity));
            }
        }
        Ok(())
    }

    /// Whether the courier poll loop should look at this order at all.
    pub fn is_trackable(&self) -> bool {
        self.tracking_number.is_some() && !self.app_status.is_terminal()
    }

    /// Append to the audit trail. The only mutation path for history.
    pub fn record_history(&mut self, entry: HistoryEntry) {
        self.message_history.push(entry);
    }

    /// Append a courier event and refresh the cached latest status text.
    pub fn append_courier_event(&mut self, event: CourierEvent) {
        self.latest_courier_status = Some(event.status_text.clone());
        self.courier_history.push(event);
    }

    pub fn last_courier_event(&self) -> Option<&CourierEvent> {
        self.courier_history.last()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_customer() -> CustomerDetails {
        CustomerDetails {
            customer_name: "Ahmed Raza".to_string(),
            phone_number: "923001234567".to_string(),
            address: "House 123, Street 4, Gulberg".to_string(),
            city: "Lahore".to_string(),
            payment_method: "COD".to_string(),
            delivery_method: Some("TCS".to_string()),
            currency_symbol: "PKR".to_string(),
            price: 2500.0,
        }
    }

    fn sample_items() -> Vec<OrderItem> {
        vec![
            OrderItem {
                name: "Wireless Mouse".to_string(),
                quantity: 1,
            },
            OrderItem {
                name: "Keyboard".to_string(),
                quantity: 1,
            },
        ]
    }

    #[test]
    fn test_create_starts_pending_with_creation_entry() {
        let order = Order::create("ORD001", sample_customer(), sample_items(), Utc::now()).unwrap();
        assert_eq!(order.app_status, AppStatus::PendingConfirmation);
        assert_eq!(order.message_status, MessageStatus::Pending);
        assert_eq!(order.message_history.len(), 1);
        assert_eq!(order.message_history[0].kind, "System: Order Created");
    }

    #[test]
    fn test_create_rejects_empty_items() {
        let result = Order::create("ORD001", sample_customer(), vec![], Utc::now());
        assert!(matches!(result, Err(OrderError::EmptyItems)));
    }

    #[test]
    fn test_create_rejects_zero_quantity() {
        let items = vec![OrderItem {
            name: "USB Hub".to_string(),
            quantity: 0,
        }];
        let result = Order::create("ORD001", sample_customer(), items, Utc::now());
        assert!(matches!(result, Err(OrderError::InvalidQuantity(0))));
    }

    #[test]
    fn test_trackable_requires_tracking_number_and_live_status() {
        let mut order =
            Order::create("ORD001", sample_customer(), sample_items(), Utc::now()).unwrap();
        assert!(!order.is_trackable());

        order.tracking_number = Some("TCS123456789".to_string());
        assert!(order.is_trackable());

        order.app_status = AppStatus::Delivered;
        assert!(!order.is_trackable());
    }

    #[test]
    fn test_append_courier_event_updates_latest() {
        let mut order =
            Order::create("ORD001", sample_customer(), sample_items(), Utc::now()).unwrap();
        order.append_courier_event(CourierEvent::new(Utc::now(), "Booked"));
        order.append_courier_event(CourierEvent::new(Utc::now(), "Arrived at Lahore Hub"));

        assert_eq!(order.courier_history.len(), 2);
        assert_eq!(
            order.latest_courier_status.as_deref(),
            Some("Arrived at Lahore Hub")
        );
        assert_eq!(order.last_courier_event().unwrap().status_text, "Arrived at Lahore Hub");
    }
}
