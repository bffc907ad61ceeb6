//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

/// Normalize a phone number to digits only.
///
/// WhatsApp identities arrive in all sorts of shapes ("+91 98765-43210",
/// "(555) 123 4567"); lookup and storage both use the digits-only form.
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Truncate text to a maximum length with ellipsis, for log lines
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone_strips_non_digits() {
        assert_eq!(normalize_phone("+91 98765-43210"), "919876543210");
        assert_eq!(normalize_phone("(555) 123 4567"), "5551234567");
        assert_eq!(normalize_phone("5551234567"), "5551234567");
    }

    #[test]
    fn test_normalize_phone_empty_and_garbage() {
        assert_eq!(normalize_phone(""), "");
        assert_eq!(normalize_phone("abc"), "");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("a longer message here", 10), "a longe...");
    }
}
