use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;

use super::limit::Limit;
use super::store::RateLimitStore;
use crate::GuardError;

/// Result of a rate limit check.
///
/// Deliberately does not expose the raw hit count; callers surface the
/// message, not the counter state.
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    /// Request is allowed. Contains remaining attempts.
    Allowed {
        remaining: u32,
        reset_at: chrono::DateTime<chrono::Utc>,
    },
    /// Request is rate limited.
    Limited { retry_after: i64, message: String },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    pub fn is_limited(&self) -> bool {
        matches!(self, Self::Limited { .. })
    }

    /// Returns the retry-after value in seconds if rate limited.
    pub fn retry_after(&self) -> Option<i64> {
        match self {
            Self::Limited { retry_after, .. } => Some(*retry_after),
            Self::Allowed { .. } => None,
        }
    }
}

/// Fixed-window rate limiter with named limit configurations.
///
/// Holds no counter state itself; all state lives in the injected store, so
/// a single limiter can be cloned freely across request handlers.
///
/// # Example
///
/// ```rust
/// use regguard::{RateLimiter, Limit, InMemoryStore};
/// use std::sync::Arc;
///
/// let store = Arc::new(InMemoryStore::new());
/// let limiter = RateLimiter::new(store)
///     .for_("login", Limit::per_minute(5))
///     .for_("signup", Limit::per_minute(3));
/// ```
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    limits: HashMap<String, Limit>,
}

impl RateLimiter {
    /// Creates a new rate limiter with the specified store.
    #[must_use]
    pub fn new(store: Arc<dyn RateLimitStore>) -> Self {
        Self {
            store,
            limits: HashMap::new(),
        }
    }

    /// Registers a named rate limit.
    #[must_use]
    pub fn for_(mut self, action: impl Into<String>, limit: Limit) -> Self {
        self.limits.insert(action.into(), limit);
        self
    }

    /// Gets a registered limit by action name.
    pub fn get_limit(&self, action: &str) -> Option<&Limit> {
        self.limits.get(action)
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &Arc<dyn RateLimitStore> {
        &self.store
    }

    /// Records a hit against a registered limit and checks if allowed.
    ///
    /// This increments the counter and returns whether the request should
    /// proceed.
    pub async fn hit(&self, action: &str, key: &str) -> Result<RateLimitResult, GuardError> {
        let limit = self
            .limits
            .get(action)
            .ok_or_else(|| GuardError::LimitNotConfigured(action.to_owned()))?;

        let full_key = format!("{action}:{key}");
        let info = self.store.increment(&full_key, limit.window_secs()).await?;

        if info.hits > limit.ceiling {
            let message = limit
                .get_message()
                .unwrap_or("Too many requests. Please try again later.")
                .to_owned();

            Ok(RateLimitResult::Limited {
                retry_after: info.available_in(),
                message,
            })
        } else {
            Ok(RateLimitResult::Allowed {
                remaining: limit.ceiling - info.hits,
                reset_at: info.reset_at,
            })
        }
    }

    /// Records a hit for an ad-hoc limit and returns whether the request is
    /// allowed.
    ///
    /// Unlike [`hit`](Self::hit), the window and ceiling are supplied by the
    /// caller instead of looked up by name. A store failure is reported as
    /// not-allowed: the guarded actions exist to stop brute forcing, so the
    /// limiter fails closed rather than open.
    pub async fn check_rate(
        &self,
        client_key: &str,
        action: &str,
        window: Duration,
        ceiling: u32,
    ) -> bool {
        let full_key = format!("{action}:{client_key}");
        let window_secs = u64::try_from(window.num_seconds()).unwrap_or(u64::MAX);

        match self.store.increment(&full_key, window_secs).await {
            Ok(info) => info.hits <= ceiling,
            Err(e) => {
                log::error!(
                    target: "regguard",
                    "msg=\"store unavailable, failing closed\", operation=\"check_rate\", action=\"{action}\", error=\"{e}\""
                );
                false
            }
        }
    }

    /// Checks if a key has exceeded the rate limit without incrementing.
    pub async fn too_many_attempts(&self, action: &str, key: &str) -> Result<bool, GuardError> {
        let limit = self
            .limits
            .get(action)
            .ok_or_else(|| GuardError::LimitNotConfigured(action.to_owned()))?;

        let full_key = format!("{action}:{key}");
        let remaining = self.store.remaining(&full_key, limit.ceiling()).await?;

        Ok(remaining == 0)
    }

    /// Returns the remaining attempts for a key.
    pub async fn remaining(&self, action: &str, key: &str) -> Result<u32, GuardError> {
        let limit = self
            .limits
            .get(action)
            .ok_or_else(|| GuardError::LimitNotConfigured(action.to_owned()))?;

        let full_key = format!("{action}:{key}");
        self.store.remaining(&full_key, limit.ceiling()).await
    }

    /// Returns seconds until the rate limit resets for a key.
    pub async fn available_in(&self, action: &str, key: &str) -> Result<i64, GuardError> {
        let full_key = format!("{action}:{key}");

        Ok(self
            .store
            .get(&full_key)
            .await?
            .map_or(0, |info| info.available_in()))
    }

    /// Clears the rate limit for a key.
    pub async fn clear(&self, action: &str, key: &str) -> Result<(), GuardError> {
        let full_key = format!("{action}:{key}");
        self.store.reset(&full_key).await
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("limits", &self.limits.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
