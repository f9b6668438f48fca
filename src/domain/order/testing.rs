use chrono::Utc;

use super::{CustomerDetails, Order, OrderItem};

// ============================================================================
// Shared Test Fixtures
// ============================================================================

pub(crate) fn customer() -> CustomerDetails {
    CustomerDetails {
        customer_name: "Fatima Ali".to_string(),
        phone_number: "923217654321".to_string(),
        address: "Apt 5B, Block 7, Clifton".to_string(),
        city: "Karachi".to_string(),
        payment_method: "COD".to_string(),
        delivery_method: Some("TCS".to_string()),
        currency_symbol: "PKR".to_string(),
        price: 1200.0,
    }
}

pub(crate) fn order(id: &str) -> Order {
    Order::create(
        id,
        customer(),
        vec![OrderItem {
            name: "USB Hub".to_string(),
            quantity: 1,
        }],
        Utc::now(),
    )
    .unwrap()
}

pub(crate) fn tracked_order(id: &str, tracking_number: &str) -> Order {
    let mut o = order(id);
    o.tracking_number = Some(tracking_number.to_string());
    o
}
