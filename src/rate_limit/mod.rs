mod limit;
mod limiter;
mod store;

#[cfg(feature = "sqlx_postgres")]
pub mod migrations;
#[cfg(feature = "sqlx_postgres")]
mod postgres_store;

pub use limit::Limit;
pub use limiter::{RateLimitResult, RateLimiter};
#[cfg(feature = "sqlx_postgres")]
pub use postgres_store::PostgresRateLimitStore;
pub use store::{InMemoryStore, RateLimitInfo, RateLimitStore};
