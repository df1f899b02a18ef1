use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// Character classes mirror the signup form's checks: ASCII-only letter
// classes, Unicode-aware digit class.
static UPPERCASE: LazyLock<Regex> = LazyLock::new(|| Regex::new("[A-Z]").unwrap());
static LOWERCASE: LazyLock<Regex> = LazyLock::new(|| Regex::new("[a-z]").unwrap());
static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").unwrap());

pub(crate) fn has_uppercase(password: &str) -> bool {
    UPPERCASE.is_match(password)
}

pub(crate) fn has_lowercase(password: &str) -> bool {
    LOWERCASE.is_match(password)
}

pub(crate) fn has_digit(password: &str) -> bool {
    DIGIT.is_match(password)
}

/// Passwords rejected regardless of composition, compared case-insensitively.
///
/// Exact match only; "mypassword1" is fine even though it contains
/// "password".
pub const DEFAULT_DENYLIST: [&str; 10] = [
    "password",
    "123456",
    "123456789",
    "qwerty",
    "abc123",
    "football",
    "letmein",
    "monkey",
    "admin",
    "12345",
];

/// Why a candidate password was rejected.
///
/// These are user-facing and surfaced verbatim; they are never logged as
/// errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyViolation {
    TooShort,
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
    MissingSpecial,
    CommonPassword,
}

impl std::fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooShort => write!(f, "Password must be at least 8 characters long"),
            Self::MissingUppercase => {
                write!(f, "Password must contain at least one uppercase letter")
            }
            Self::MissingLowercase => {
                write!(f, "Password must contain at least one lowercase letter")
            }
            Self::MissingDigit => write!(f, "Password must contain at least one number"),
            Self::MissingSpecial => {
                write!(f, "Password must contain at least one special character")
            }
            Self::CommonPassword => {
                write!(f, "Password is too common. Please choose a stronger password")
            }
        }
    }
}

impl std::error::Error for PolicyViolation {}

/// Password acceptance rules for registration and password reset.
///
/// Rules are applied in a fixed order and the first failure wins: length,
/// uppercase, lowercase, digit, special character, denylist. The default
/// policy matches what the signup form enforces.
///
/// # Examples
///
/// ```
/// use regguard::{PasswordPolicy, PolicyViolation};
///
/// let policy = PasswordPolicy::default();
/// assert!(policy.validate("MyP@ssw0rd").is_ok());
/// assert_eq!(
///     policy.validate("short").unwrap_err(),
///     PolicyViolation::TooShort,
/// );
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordPolicy {
    /// Minimum password length in characters (default: 8)
    pub min_length: usize,
    /// Disallowed common passwords, compared case-insensitively
    pub denylist: Vec<String>,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            denylist: DEFAULT_DENYLIST.iter().map(|p| (*p).to_owned()).collect(),
        }
    }
}

impl PasswordPolicy {
    /// Creates a policy with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum password length.
    #[must_use]
    pub fn min(mut self, len: usize) -> Self {
        self.min_length = len;
        self
    }

    /// Replaces the denylist of common passwords.
    #[must_use]
    pub fn denylist(mut self, passwords: Vec<String>) -> Self {
        self.denylist = passwords;
        self
    }

    /// Validates a password against this policy.
    ///
    /// # Errors
    ///
    /// Returns the first [`PolicyViolation`] encountered, in rule order.
    pub fn validate(&self, password: &str) -> Result<(), PolicyViolation> {
        if password.chars().count() < self.min_length {
            return Err(PolicyViolation::TooShort);
        }

        if !has_uppercase(password) {
            return Err(PolicyViolation::MissingUppercase);
        }

        if !has_lowercase(password) {
            return Err(PolicyViolation::MissingLowercase);
        }

        if !has_digit(password) {
            return Err(PolicyViolation::MissingDigit);
        }

        if !password.chars().any(is_special_char) {
            return Err(PolicyViolation::MissingSpecial);
        }

        if self
            .denylist
            .iter()
            .any(|p| p.eq_ignore_ascii_case(password))
        {
            return Err(PolicyViolation::CommonPassword);
        }

        Ok(())
    }
}

/// Checks if a character counts as special for policy and strength purposes.
pub(crate) fn is_special_char(c: char) -> bool {
    matches!(
        c,
        '!' | '@'
            | '#'
            | '$'
            | '%'
            | '^'
            | '&'
            | '*'
            | '('
            | ')'
            | ','
            | '.'
            | '?'
            | '"'
            | ':'
            | '{'
            | '}'
            | '|'
            | '<'
            | '>'
    )
}

/// Validates a password using the default policy.
///
/// For custom rules, use [`PasswordPolicy`] directly.
pub fn validate_password(password: &str) -> Result<(), PolicyViolation> {
    PasswordPolicy::default().validate(password)
}
