//! PostgreSQL persistence for the network access portal.
//!
//! Tables: `users`, `access_requests`, `audit_logs`, `configurations`.
//! Model functions take any `PgExecutor`, so the same query runs against
//! the pool or inside a caller's transaction.
//!
//! # Example
//!
//! ```rust,ignore
//! use portal_db::{connect, run_migrations, AccessRequest};
//!
//! let pool = connect("postgres://localhost/portal", 10).await?;
//! run_migrations(&pool).await?;
//! let request = AccessRequest::find_by_id(&pool, id).await?;
//! ```

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;

pub use error::DbError;
pub use migrations::run_migrations;
pub use models::*;
pub use pool::connect;

/// Postgres SQLSTATE for unique constraint violations.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Whether `err` is a unique violation on the named constraint.
#[must_use]
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
                && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}
