//! Mobile number utilities

use once_cell::sync::Lazy;
use regex::Regex;

// Iranian mobile number: 11 digits starting with 09
static MOBILE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^09\d{9}$").unwrap());

/// Normalize a mobile number by removing common formatting characters
/// and rewriting the `+98` / `0098` country prefix to the national `0`.
pub fn normalize_mobile_number(mobile: &str) -> String {
    let digits: String = mobile
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if let Some(rest) = digits.strip_prefix("+98") {
        format!("0{}", rest)
    } else if let Some(rest) = digits.strip_prefix("0098") {
        format!("0{}", rest)
    } else {
        digits
    }
}

/// Check if a mobile number is valid (national format, `09XXXXXXXXX`)
pub fn is_valid_mobile_number(mobile: &str) -> bool {
    MOBILE_REGEX.is_match(mobile)
}

/// Mask a mobile number for logs and display (e.g., 0911****222)
pub fn mask_mobile_number(mobile: &str) -> String {
    let chars: Vec<char> = mobile.chars().collect();
    if chars.len() >= 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 3..].iter().collect();
        format!("{}****{}", head, tail)
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mobile_number() {
        assert_eq!(normalize_mobile_number("0911-111-2222"), "09111112222");
        assert_eq!(normalize_mobile_number("+98 911 111 2222"), "09111112222");
        assert_eq!(normalize_mobile_number("00989111112222"), "09111112222");
    }

    #[test]
    fn test_is_valid_mobile_number() {
        assert!(is_valid_mobile_number("09111112222"));
        assert!(is_valid_mobile_number("09351234567"));
        assert!(!is_valid_mobile_number("9111112222")); // Missing leading zero
        assert!(!is_valid_mobile_number("0911111222")); // Too short
        assert!(!is_valid_mobile_number("091111122223")); // Too long
        assert!(!is_valid_mobile_number("08111112222")); // Not a mobile prefix
    }

    #[test]
    fn test_mask_mobile_number() {
        assert_eq!(mask_mobile_number("09111112222"), "0911****222");
        assert_eq!(mask_mobile_number("12345"), "****");
    }
}
