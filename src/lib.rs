pub mod config;
pub mod password;
pub mod rate_limit;

pub use config::GuardConfig;
pub use password::{
    PasswordCheckResult, PasswordPolicy, PolicyViolation, check_password, strength,
    validate_password,
};
#[cfg(feature = "sqlx_postgres")]
pub use rate_limit::PostgresRateLimitStore;
pub use rate_limit::{
    InMemoryStore, Limit, RateLimitInfo, RateLimitResult, RateLimitStore, RateLimiter,
};

use std::fmt;

/// Errors produced by the rate limiting side of the crate.
///
/// Password policy violations are not errors; they are returned as
/// [`PolicyViolation`] values and surfaced verbatim to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardError {
    /// The counter store could not be read or written. Callers should fail
    /// the guarded action closed (treat as rate-exceeded), never open.
    StoreUnavailable(String),
    /// A named limit was referenced before being registered.
    LimitNotConfigured(String),
}

impl std::error::Error for GuardError {}

impl fmt::Display for GuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardError::StoreUnavailable(msg) => write!(f, "Rate limit store unavailable: {msg}"),
            GuardError::LimitNotConfigured(name) => {
                write!(f, "Rate limit '{name}' not configured")
            }
        }
    }
}
