// ============================================================================
// Phone Number Normalization
// ============================================================================
//
// The notification gateway requires a single country-coded digit format
// (92xxxxxxxxxx). Anything that cannot be normalized is rejected before the
// gateway is ever called.
//
// ============================================================================

const COUNTRY_CODE: &str = "92";

/// Normalize to `92xxxxxxxxxx`, or `None` for numbers that cannot be
/// expressed in that format.
pub fn normalize(phone: &str) -> Option<String> {
    let mut digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if let Some(stripped) = digits.strip_prefix('0') {
        digits = stripped.to_string();
    }

    if digits.len() == 10 && !digits.starts_with(COUNTRY_CODE) {
        Some(format!("{}{}", COUNTRY_CODE, digits))
    } else if digits.starts_with(COUNTRY_CODE) && digits.len() == 12 {
        Some(digits)
    } else if digits.starts_with("920") && digits.len() == 13 {
        // e.g. 9203001234567 - an embedded trunk zero after the country code
        Some(format!("{}{}", COUNTRY_CODE, &digits[3..]))
    } else {
        None
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_format_gets_country_code() {
        assert_eq!(normalize("03001234567").as_deref(), Some("923001234567"));
    }

    #[test]
    fn test_already_normalized_passes_through() {
        assert_eq!(normalize("923001234567").as_deref(), Some("923001234567"));
    }

    #[test]
    fn test_formatting_characters_are_stripped() {
        assert_eq!(normalize("+92 300 123-4567").as_deref(), Some("923001234567"));
        assert_eq!(normalize("(0300) 1234567").as_deref(), Some("923001234567"));
    }

    #[test]
    fn test_embedded_trunk_zero_is_dropped() {
        assert_eq!(normalize("9203001234567").as_deref(), Some("923001234567"));
    }

    #[test]
    fn test_unusable_numbers_are_rejected() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("12345"), None);
        assert_eq!(normalize("not a phone"), None);
        // Too many digits for the country format.
        assert_eq!(normalize("9230012345678"), None);
    }
}
