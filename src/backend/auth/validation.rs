/**
 * Registration Field Validation
 *
 * Checks applied to a registration before storage is touched. Each failure
 * maps to its own registration response code.
 *
 * - Username: 3-30 chars, starts with a letter, letters/digits/underscore
 * - E-mail: one `@`, non-empty local part, dotted domain, no whitespace
 * - Password: at least 10 chars with an upper-case letter, a lower-case
 *   letter and a digit
 */

use crate::shared::protocol::{RegistrationCode, RegistrationPayload};

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 10;

/// Validate username format
pub fn is_valid_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 30 {
        return false;
    }

    let mut chars = username.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate e-mail address syntax
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

/// Validate password strength
pub fn is_valid_password(password: &str) -> bool {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return false;
    }

    let has_upper = password.chars().any(char::is_uppercase);
    let has_lower = password.chars().any(char::is_lowercase);
    let has_digit = password.chars().any(char::is_numeric);

    has_upper && has_lower && has_digit
}

/// First validation failure of a registration, if any
///
/// E-mail is checked first, then password, then username.
pub fn check_registration(payload: &RegistrationPayload) -> Option<RegistrationCode> {
    if !is_valid_email(&payload.email) {
        return Some(RegistrationCode::EmailInvalid);
    }
    if !is_valid_password(&payload.password) {
        return Some(RegistrationCode::PasswordInvalid);
    }
    if !is_valid_username(&payload.username) {
        return Some(RegistrationCode::UsernameInvalid);
    }
    None
}
