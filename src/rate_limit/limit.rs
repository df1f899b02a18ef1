use chrono::Duration;

/// Ceiling and window for one protected action.
///
/// The limit itself is policy-free data; [`RateLimiter`](super::RateLimiter)
/// compares counter state against it.
#[derive(Debug, Clone)]
pub struct Limit {
    pub(crate) ceiling: u32,
    pub(crate) window: Duration,
    pub(crate) message: Option<String>,
}

impl Limit {
    #[must_use]
    pub fn new(ceiling: u32, window: Duration) -> Self {
        Self {
            ceiling,
            window,
            message: None,
        }
    }

    #[must_use]
    pub fn per_second(ceiling: u32) -> Self {
        Self::new(ceiling, Duration::seconds(1))
    }

    #[must_use]
    pub fn per_minute(ceiling: u32) -> Self {
        Self::new(ceiling, Duration::minutes(1))
    }

    #[must_use]
    pub fn per_hour(ceiling: u32) -> Self {
        Self::new(ceiling, Duration::hours(1))
    }

    #[must_use]
    pub fn per_day(ceiling: u32) -> Self {
        Self::new(ceiling, Duration::days(1))
    }

    /// Overrides the message returned when the limit is hit.
    #[must_use]
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    pub fn window_secs(&self) -> u64 {
        u64::try_from(self.window.num_seconds()).unwrap_or(u64::MAX)
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    pub fn get_message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
