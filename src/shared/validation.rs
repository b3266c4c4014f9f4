//! Input Validation Helpers
//!
//! Small pure helpers used by the account and message handlers: email and
//! password checks, input sanitizing, avatar colors and display dates.

use chrono::{DateTime, Utc};

use crate::shared::error::SharedError;

/// Minimum password length accepted at signup
pub const MIN_PASSWORD_LEN: usize = 6;

/// Maximum message body length (in characters) after sanitizing
pub const MAX_MESSAGE_LEN: usize = 4096;

/// Palette used for generated avatars
pub const AVATAR_COLORS: [&str; 8] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8C8", "#F7DC6F",
];

/// Check an email address has the shape `local@domain.tld`
///
/// Mirrors `^[^\s@]+@[^\s@]+\.[^\s@]+$`: exactly one `@`, no whitespace,
/// a non-empty local part and a domain with a dot that is neither first
/// nor last.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };

    if local.is_empty() {
        return false;
    }

    // Some dot must split the domain into two non-empty halves
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Check password strength
pub fn validate_password(password: &str) -> Result<(), SharedError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(SharedError::validation(
            "password",
            "Password must be at least 6 characters long",
        ));
    }
    Ok(())
}

/// Trim and strip angle brackets
pub fn sanitize_input(input: &str) -> String {
    input.trim().replace(['<', '>'], "")
}

/// Sanitize a message body and enforce its bounds
pub fn validate_message_body(body: &str) -> Result<String, SharedError> {
    let clean = sanitize_input(body);
    if clean.is_empty() {
        return Err(SharedError::validation("body", "Message cannot be empty"));
    }
    if clean.chars().count() > MAX_MESSAGE_LEN {
        return Err(SharedError::validation(
            "body",
            format!("Message cannot exceed {} characters", MAX_MESSAGE_LEN),
        ));
    }
    Ok(clean)
}

/// Pick an avatar color for a seed (usually the user id bytes)
pub fn avatar_color_for(seed: &[u8]) -> &'static str {
    let index = seed.iter().fold(0usize, |acc, b| acc.wrapping_add(*b as usize));
    AVATAR_COLORS[index % AVATAR_COLORS.len()]
}

/// Format a timestamp for display, e.g. `Oct 16, 2026, 07:48 PM`
pub fn format_display_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y, %I:%M %p").to_string()
}
