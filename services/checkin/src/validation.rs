//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Failed to compile email regex")
    })
}

/// `local@domain.tld` shape check, no network involved
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if !is_valid_email(email) {
        return Err("Please enter a valid email address.".to_string());
    }

    Ok(())
}
