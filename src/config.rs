//! Configuration for the registration guard.
//!
//! Centralizes the per-action rate limits that were previously hardcoded at
//! each endpoint.
//!
//! # Example
//!
//! ```rust
//! use regguard::{GuardConfig, InMemoryStore, Limit};
//! use std::sync::Arc;
//!
//! // Use defaults
//! let config = GuardConfig::default();
//!
//! // Or customize
//! let config = GuardConfig {
//!     login: Limit::per_minute(10),
//!     ..Default::default()
//! };
//!
//! let limiter = config.limiter(Arc::new(InMemoryStore::new()));
//! ```

use std::sync::Arc;

use chrono::Duration;

use crate::rate_limit::{Limit, RateLimitStore, RateLimiter};

/// Rate limits for the three guarded actions.
///
/// Defaults match the production deployment: 5 login attempts and 3 signup
/// attempts per minute per client.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Limit applied to authentication attempts.
    ///
    /// Default: 5 per minute
    pub login: Limit,

    /// Limit applied to account creation.
    ///
    /// Default: 3 per minute
    pub signup: Limit,

    /// Limit applied to password reset requests.
    ///
    /// Default: 3 per minute
    pub password_reset: Limit,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login: Limit::per_minute(5),
            signup: Limit::per_minute(3),
            password_reset: Limit::per_minute(3),
        }
    }
}

impl GuardConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration suitable for development/testing.
    ///
    /// Uses more lenient limits so manual testing doesn't trip them.
    pub fn development() -> Self {
        Self {
            login: Limit::per_minute(30),
            signup: Limit::per_minute(30),
            password_reset: Limit::per_minute(30),
        }
    }

    /// Creates a configuration with stricter limits.
    pub fn strict() -> Self {
        Self {
            login: Limit::new(3, Duration::minutes(15)),
            signup: Limit::per_hour(3),
            password_reset: Limit::per_hour(3),
        }
    }

    /// Builds a [`RateLimiter`] with the three guarded actions registered.
    #[must_use]
    pub fn limiter(&self, store: Arc<dyn RateLimitStore>) -> RateLimiter {
        RateLimiter::new(store)
            .for_("login", self.login.clone())
            .for_("signup", self.signup.clone())
            .for_("password_reset", self.password_reset.clone())
    }
}
