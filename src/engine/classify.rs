// ============================================================================
// Courier Status Classification
// ============================================================================
//
// Maps free-text courier status lines to an application status class using
// a prioritized keyword table. First match wins; anything unmatched is left
// to the caller (the reconciler treats it as in-transit movement).
//
// The table is data, not code: new courier phrasings are added here without
// touching the reconciler.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Delivered,
    OutForDelivery,
    AddressIssue,
}

pub struct KeywordRule {
    pub class: StatusClass,
    pub keywords: &'static [&'static str],
}

/// Priority order matters: a line mentioning both delivery completion and an
/// exception is classified by the earliest rule it matches.
pub const CLASSIFICATION_RULES: &[KeywordRule] = &[
    KeywordRule {
        class: StatusClass::Delivered,
        keywords: &["delivered successfully", "delivered to"],
    },
    KeywordRule {
        class: StatusClass::OutForDelivery,
        keywords: &["out for delivery"],
    },
    KeywordRule {
        class: StatusClass::AddressIssue,
        keywords: &[
            "address information needed",
            "incomplete address",
            "recipient premises closed",
            "no answer",
        ],
    },
];

const PREMISES_CLOSED_KEYWORD: &str = "premises closed";
const PICKED_UP_KEYWORDS: &[&str] = &["booked", "picked up"];

/// Classify a courier status line, or `None` when no rule matches.
pub fn classify(status_text: &str) -> Option<StatusClass> {
    let lowered = status_text.to_lowercase();
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|rule| rule.class)
}

/// Distinguishes the premises-closed flavor of an address issue. Used by the
/// intent selector, not the reconciler: both flavors share AppStatus::AddressIssue.
pub fn is_premises_closed(status_text: &str) -> bool {
    status_text.to_lowercase().contains(PREMISES_CLOSED_KEYWORD)
}

/// Booked / picked-up probe for the shipment-picked-up notification.
pub fn is_picked_up(status_text: &str) -> bool {
    let lowered = status_text.to_lowercase();
    PICKED_UP_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_each_class() {
        assert_eq!(classify("Delivered Successfully"), Some(StatusClass::Delivered));
        assert_eq!(classify("Delivered to Customer"), Some(StatusClass::Delivered));
        assert_eq!(
            classify("Out for Delivery from Lahore Station"),
            Some(StatusClass::OutForDelivery)
        );
        assert_eq!(
            classify("Delivery Attempted - Incomplete Address"),
            Some(StatusClass::AddressIssue)
        );
        assert_eq!(
            classify("Recipient Premises Closed"),
            Some(StatusClass::AddressIssue)
        );
        assert_eq!(classify("No Answer at door"), Some(StatusClass::AddressIssue));
    }

    #[test]
    fn test_unmatched_statuses_fall_through() {
        assert_eq!(classify("Booked"), None);
        assert_eq!(classify("Arrived at Lahore Sorting Facility"), None);
        assert_eq!(classify("Departed from Karachi Hub"), None);
        assert_eq!(classify("Shipment delay"), None);
    }

    #[test]
    fn test_priority_delivered_beats_exception_wording() {
        // A corrective line mentioning both outcomes resolves by priority.
        assert_eq!(
            classify("Delivered Successfully after incomplete address correction"),
            Some(StatusClass::Delivered)
        );
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(classify("OUT FOR DELIVERY"), Some(StatusClass::OutForDelivery));
        assert!(is_premises_closed("RECIPIENT PREMISES CLOSED"));
    }

    #[test]
    fn test_premises_closed_probe() {
        assert!(is_premises_closed("Recipient Premises Closed"));
        assert!(!is_premises_closed("Address Information Needed"));
    }

    #[test]
    fn test_picked_up_probe() {
        assert!(is_picked_up("Booked"));
        assert!(is_picked_up("Shipment Picked Up from shipper"));
        assert!(!is_picked_up("Arrived at Karachi Hub"));
    }
}
