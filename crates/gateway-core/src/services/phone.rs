//! Phone normalization into the CRM's 11-digit, leading-7 form

use crate::error::{GatewayError, Result};
use crate::types::NormalizedPhone;
use once_cell::sync::Lazy;
use regex::Regex;

// ASCII only: `\D` would keep non-Latin digits
static NON_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9]").expect("Failed to compile non-digit regex"));

/// Strip everything but digits, then coerce to `7XXXXXXXXXX`.
///
/// An 11-digit number starting with 8 gets its trunk prefix rewritten to 7,
/// a 10-digit number gets 7 prepended. Anything else that is not already
/// 11 digits starting with 7 is rejected.
pub fn normalize_phone(input: &str) -> Result<NormalizedPhone> {
    let mut digits = NON_DIGITS.replace_all(input, "").into_owned();

    if digits.len() == 11 && digits.starts_with('8') {
        digits.replace_range(..1, "7");
    }
    if digits.len() == 10 {
        digits.insert(0, '7');
    }

    if digits.len() == 11 && digits.starts_with('7') {
        Ok(NormalizedPhone::from_checked(digits))
    } else {
        Err(GatewayError::InvalidPhone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(input: &str) -> String {
        normalize_phone(input).unwrap().as_str().to_string()
    }

    #[test]
    fn test_formatted_russian_number() {
        assert_eq!(normalized("+7 (999) 123-45-67"), "79991234567");
        assert_eq!(normalized("79991234567"), "79991234567");
    }

    #[test]
    fn test_trunk_prefix_eight_is_rewritten() {
        assert_eq!(normalized("8 (999) 123-45-67"), "79991234567");
        assert_eq!(normalized("89001112233"), "79001112233");
    }

    #[test]
    fn test_ten_digits_get_country_code() {
        assert_eq!(normalized("999 123 45 67"), "79991234567");
        assert_eq!(normalized("0001112233"), "70001112233");
    }

    #[test]
    fn test_every_eight_prefixed_body_maps_to_seven() {
        for body in ["0000000000", "9991234567", "1234567890", "5555555555"] {
            assert_eq!(normalized(&format!("8{}", body)), format!("7{}", body));
            assert_eq!(normalized(body), format!("7{}", body));
        }
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for input in ["+7 (999) 123-45-67", "8-900-111-22-33", "9001112233"] {
            let once = normalized(input);
            assert_eq!(normalized(&once), once);
        }
    }

    #[test]
    fn test_other_shapes_are_rejected() {
        for input in [
            "",
            "no digits",
            "12345",
            "123456789",          // 9 digits
            "19991234567",        // 11 digits, wrong prefix
            "799912345678",       // 12 digits
            "+44 20 7946 0958",   // 12 digits
            "٧٩٩٩١٢٣٤٥٦٧",        // Arabic-Indic digits are not ASCII
        ] {
            assert!(
                matches!(normalize_phone(input), Err(GatewayError::InvalidPhone)),
                "expected rejection for {:?}",
                input
            );
        }
    }
}
