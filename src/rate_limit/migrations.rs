//! Schema setup for the `PostgreSQL` rate limit store.

use sqlx::PgPool;

use crate::GuardError;

/// Creates the `rate_limits` table and its indexes if they don't exist.
///
/// # Errors
///
/// Returns [`GuardError::StoreUnavailable`] if the statements cannot be
/// executed.
pub async fn run_all(pool: &PgPool) -> Result<(), GuardError> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS rate_limits (
            key VARCHAR(255) PRIMARY KEY,
            hits INTEGER NOT NULL DEFAULT 1,
            reset_time TIMESTAMPTZ NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        ",
    )
    .execute(pool)
    .await
    .map_err(|e| {
        log::error!(target: "regguard", "msg=\"database error\", operation=\"create_rate_limits_table\", error=\"{e}\"");
        GuardError::StoreUnavailable(e.to_string())
    })?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_rate_limits_reset_time ON rate_limits(reset_time)")
        .execute(pool)
        .await
        .map_err(|e| {
            log::error!(target: "regguard", "msg=\"database error\", operation=\"create_rate_limits_index\", error=\"{e}\"");
            GuardError::StoreUnavailable(e.to_string())
        })?;

    Ok(())
}
