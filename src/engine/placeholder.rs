use crate::domain::order::Order;
use crate::settings::AppSettings;

// ============================================================================
// Placeholder Engine
// ============================================================================
//
// Pure token substitution over user-editable templates. The vocabulary is
// closed; unknown tokens are left verbatim since templates are free text.
// Substitution is literal and global - `str::replace` matches the token
// exactly, so tokens never act as patterns.
//
// ============================================================================

pub const TRACKING_URL_PREFIX: &str = "https://www.tcsexpress.com/track/";

const EMPTY_ITEMS_TEXT: &str = "- _Order items ki tafseel mojood nahi._";

/// Render a template against an order and the application settings.
/// No side effects; deterministic for fixed inputs.
pub fn render(template: &str, order: &Order, settings: &AppSettings) -> String {
    let discount_pct = settings.advance_discount_percentage;
    let advance_price = (order.customer.price * (1.0 - f64::from(discount_pct) / 100.0)).round();

    let tracking_link = match &order.tracking_number {
        Some(cn) => format!("{}{}", TRACKING_URL_PREFIX, cn),
        None => "N/A".to_string(),
    };

    // A token with no value (e.g. no tracking number yet) stays verbatim so
    // the operator can see the gap in the preview.
    let substitutions: [(&str, Option<String>); 19] = [
        ("{{customerName}}", Some(order.customer.customer_name.clone())),
        ("{{orderId}}", Some(order.id.clone())),
        ("{{phoneNumber}}", Some(order.customer.phone_number.clone())),
        ("{{address}}", Some(order.customer.address.clone())),
        ("{{city}}", Some(order.customer.city.clone())),
        (
            "{{totalAmount}}",
            Some(format!(
                "{} {}",
                order.customer.currency_symbol,
                order.customer.price.round() as i64
            )),
        ),
        ("{{currencySymbol}}", Some(order.customer.currency_symbol.clone())),
        ("{{paymentMethod}}", Some(order.customer.payment_method.clone())),
        ("{{deliveryMethod}}", order.customer.delivery_method.clone()),
        (
            "{{orderDate}}",
            Some(order.order_timestamp.format("%d/%m/%Y").to_string()),
        ),
        ("{{itemsList}}", Some(items_list(order))),
        ("{{trackingNumber}}", order.tracking_number.clone()),
        ("{{trackingLink}}", Some(tracking_link)),
        ("{{latestCourierStatus}}", order.latest_courier_status.clone()),
        (
            "{{advancePaymentPrice}}",
            Some(format!(
                "{} {}",
                order.customer.currency_symbol, advance_price as i64
            )),
        ),
        (
            "{{paymentAccountNumber}}",
            Some(settings.payment_account_number.clone()),
        ),
        (
            "{{paymentAccountName}}",
            Some(settings.payment_account_name.clone()),
        ),
        ("{{discountPercentage}}", Some(discount_pct.to_string())),
        ("{{appStatus}}", Some(order.app_status.to_string())),
    ];

    let mut message = template.to_string();
    for (token, value) in substitutions {
        if let Some(value) = value {
            message = message.replace(token, &value);
        }
    }
    message
}

fn items_list(order: &Order) -> String {
    if order.items.is_empty() {
        return EMPTY_ITEMS_TEXT.to_string();
    }
    order
        .items
        .iter()
        .map(|item| format!("- {} (Qty: {})", item.name, item.quantity))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Unit Tests
// ============================================================================
