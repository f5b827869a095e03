//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

use crate::models::UserProfile;

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok());

    match regex {
        Some(regex) if regex.is_match(email) => Ok(()),
        _ => Err("Invalid email format".to_string()),
    }
}

/// Validate password
///
/// Only length is enforced; strength policy belongs to the client.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    // Argon2 accepts more, but nobody types this much
    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate the personal details given at registration
pub fn validate_profile(profile: &UserProfile) -> Result<(), String> {
    validate_name("First name", &profile.first_name)?;
    validate_name("Last name", &profile.last_name)?;

    if let Some(phone) = &profile.phone {
        if phone.len() > 32 {
            return Err("Phone must be at most 32 characters long".to_string());
        }
    }

    Ok(())
}

fn validate_name(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }

    if value.chars().count() > 100 {
        return Err(format!("{} must be at most 100 characters long", field));
    }

    Ok(())
}
