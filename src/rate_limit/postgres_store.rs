use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::store::{RateLimitInfo, RateLimitStore};
use crate::GuardError;

/// `PostgreSQL`-backed rate limit store.
///
/// Suitable for deployments where multiple instances need to share rate
/// limit state. See [`migrations::run_all`](super::migrations::run_all) for
/// the expected `rate_limits` table.
#[derive(Clone)]
pub struct PostgresRateLimitStore {
    pool: PgPool,
}

impl PostgresRateLimitStore {
    /// Creates a new `PostgreSQL` rate limit store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Cleans up expired entries.
    ///
    /// The store never deletes rows on its own, so call this periodically to
    /// prevent table growth.
    pub async fn cleanup_expired(&self) -> Result<u64, GuardError> {
        let result = sqlx::query("DELETE FROM rate_limits WHERE reset_time < NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                log::error!(target: "regguard", "msg=\"database error\", operation=\"cleanup_expired_rate_limits\", error=\"{e}\"");
                GuardError::StoreUnavailable(e.to_string())
            })?;

        Ok(result.rows_affected())
    }
}

#[derive(sqlx::FromRow)]
struct RateLimitRow {
    hits: i32,
    reset_time: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl RateLimitStore for PostgresRateLimitStore {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn increment(&self, key: &str, window_secs: u64) -> Result<RateLimitInfo, GuardError> {
        let window_interval = format!("{window_secs} seconds");

        // Use UPSERT to atomically increment or create
        let row: RateLimitRow = sqlx::query_as(
            r"
            INSERT INTO rate_limits (key, hits, reset_time, created_at, updated_at)
            VALUES ($1, 1, NOW() + $2::interval, NOW(), NOW())
            ON CONFLICT (key) DO UPDATE SET
                hits = CASE
                    WHEN rate_limits.reset_time <= NOW() THEN 1
                    ELSE rate_limits.hits + 1
                END,
                reset_time = CASE
                    WHEN rate_limits.reset_time <= NOW() THEN NOW() + $2::interval
                    ELSE rate_limits.reset_time
                END,
                updated_at = NOW()
            RETURNING hits, reset_time, created_at
            ",
        )
        .bind(key)
        .bind(&window_interval)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            log::error!(target: "regguard", "msg=\"database error\", operation=\"rate_limit_increment\", error=\"{e}\"");
            GuardError::StoreUnavailable(e.to_string())
        })?;

        Ok(RateLimitInfo {
            hits: u32::try_from(row.hits).unwrap_or(u32::MAX),
            reset_at: row.reset_time,
            created_at: row.created_at,
        })
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn get(&self, key: &str) -> Result<Option<RateLimitInfo>, GuardError> {
        let row: Option<RateLimitRow> =
            sqlx::query_as("SELECT hits, reset_time, created_at FROM rate_limits WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    log::error!(target: "regguard", "msg=\"database error\", operation=\"rate_limit_get\", error=\"{e}\"");
                    GuardError::StoreUnavailable(e.to_string())
                })?;

        Ok(row.map(|r| RateLimitInfo {
            hits: u32::try_from(r.hits).unwrap_or(u32::MAX),
            reset_at: r.reset_time,
            created_at: r.created_at,
        }))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn reset(&self, key: &str) -> Result<(), GuardError> {
        sqlx::query("DELETE FROM rate_limits WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                log::error!(target: "regguard", "msg=\"database error\", operation=\"rate_limit_reset\", error=\"{e}\"");
                GuardError::StoreUnavailable(e.to_string())
            })?;

        Ok(())
    }
}
