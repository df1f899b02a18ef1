use serde::{Deserialize, Serialize};

use super::policy::{PasswordPolicy, has_digit, has_lowercase, has_uppercase, is_special_char};

/// Outcome of a full password check, shaped for the signup form.
///
/// `strength` is computed independently of `valid`: a rejected password can
/// still score, which lets the form render a meter while the user types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordCheckResult {
    pub valid: bool,
    pub message: String,
    pub strength: u8,
}

/// Scores a password from 0 to 100.
///
/// Length contributes up to 25 points (2 per character); each character
/// class present adds a fixed bonus: 25 for uppercase, 25 for lowercase,
/// 15 for digits, 10 for special characters. The total is capped at 100.
#[must_use]
pub fn strength(password: &str) -> u8 {
    let length = password.chars().count();
    let mut score = (length * 2).min(25);

    if has_uppercase(password) {
        score += 25;
    }
    if has_lowercase(password) {
        score += 25;
    }
    if has_digit(password) {
        score += 15;
    }
    if password.chars().any(is_special_char) {
        score += 10;
    }

    u8::try_from(score.min(100)).unwrap_or(100)
}

/// Validates and scores a password with the default policy.
///
/// # Examples
///
/// ```
/// use regguard::check_password;
///
/// let result = check_password("MyP@ssw0rd");
/// assert!(result.valid);
/// assert_eq!(result.message, "Password meets all requirements");
/// ```
#[must_use]
pub fn check_password(password: &str) -> PasswordCheckResult {
    let (valid, message) = match PasswordPolicy::default().validate(password) {
        Ok(()) => (true, "Password meets all requirements".to_owned()),
        Err(violation) => (false, violation.to_string()),
    };

    PasswordCheckResult {
        valid,
        message,
        strength: strength(password),
    }
}
