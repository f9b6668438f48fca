use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Application Settings
// ============================================================================
//
// Read-only configuration bag consumed by the placeholder engine and the
// scheduling actors. Values come from the environment with sensible
// defaults; nothing here is mutated at runtime.
//
// ============================================================================

pub const DEFAULT_CONFIRMATION_DELAY_HOURS: u64 = 2;
pub const DEFAULT_POLLING_INTERVAL_SECONDS: u64 = 30;
pub const DEFAULT_REMINDER_SCAN_INTERVAL_SECONDS: u64 = 3600;
pub const DEFAULT_SEND_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_ADVANCE_DISCOUNT_PERCENTAGE: u32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Hours to wait after the initial notification before a confirmation
    /// reminder becomes due.
    pub confirmation_delay_hours: u64,
    /// Courier polling cadence.
    pub polling_interval_seconds: u64,
    /// Reminder scan cadence, independent of the courier poll cadence.
    pub reminder_scan_interval_seconds: u64,
    /// Upper bound on a single notification send.
    pub send_timeout_seconds: u64,
    /// Advance-payment account advertised in new-order messages.
    pub payment_account_number: String,
    pub payment_account_name: String,
    /// Discount applied when the customer pays in advance.
    pub advance_discount_percentage: u32,
    /// Port for the prometheus scrape endpoint.
    pub metrics_port: u16,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            confirmation_delay_hours: DEFAULT_CONFIRMATION_DELAY_HOURS,
            polling_interval_seconds: DEFAULT_POLLING_INTERVAL_SECONDS,
            reminder_scan_interval_seconds: DEFAULT_REMINDER_SCAN_INTERVAL_SECONDS,
            send_timeout_seconds: DEFAULT_SEND_TIMEOUT_SECONDS,
            payment_account_number: "0312-3456789".to_string(),
            payment_account_name: "ApnaStore Online".to_string(),
            advance_discount_percentage: DEFAULT_ADVANCE_DISCOUNT_PERCENTAGE,
            metrics_port: 9090,
        }
    }
}

impl AppSettings {
    /// Build settings from `ORDER_NOTIFY_*` environment variables, falling
    /// back to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            confirmation_delay_hours: env_parse(
                "ORDER_NOTIFY_CONFIRMATION_DELAY_HOURS",
                defaults.confirmation_delay_hours,
            ),
            polling_interval_seconds: env_parse(
                "ORDER_NOTIFY_POLLING_INTERVAL_SECONDS",
                defaults.polling_interval_seconds,
            ),
            reminder_scan_interval_seconds: env_parse(
                "ORDER_NOTIFY_REMINDER_SCAN_INTERVAL_SECONDS",
                defaults.reminder_scan_interval_seconds,
            ),
            send_timeout_seconds: env_parse(
                "ORDER_NOTIFY_SEND_TIMEOUT_SECONDS",
                defaults.send_timeout_seconds,
            ),
            payment_account_number: std::env::var("ORDER_NOTIFY_PAYMENT_ACCOUNT_NUMBER")
                .unwrap_or(defaults.payment_account_number),
            payment_account_name: std::env::var("ORDER_NOTIFY_PAYMENT_ACCOUNT_NAME")
                .unwrap_or(defaults.payment_account_name),
            advance_discount_percentage: env_parse(
                "ORDER_NOTIFY_ADVANCE_DISCOUNT_PERCENTAGE",
                defaults.advance_discount_percentage,
            ),
            metrics_port: env_parse("ORDER_NOTIFY_METRICS_PORT", defaults.metrics_port),
        }
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval_seconds)
    }

    pub fn reminder_scan_interval(&self) -> Duration {
        Duration::from_secs(self.reminder_scan_interval_seconds)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_seconds)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let settings = AppSettings::default();
        assert_eq!(settings.confirmation_delay_hours, 2);
        assert_eq!(settings.polling_interval_seconds, 30);
        assert_eq!(settings.advance_discount_percentage, 10);
        assert_eq!(settings.send_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_env_parse_falls_back_on_garbage() {
        std::env::set_var("ORDER_NOTIFY_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_parse("ORDER_NOTIFY_TEST_GARBAGE", 7u64), 7);
        std::env::remove_var("ORDER_NOTIFY_TEST_GARBAGE");
    }
}
