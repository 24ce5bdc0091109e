use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{Engineer, EngineerFilter};

/// Errors raised by engineer stores and their transactions
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already exists: {0}")]
    Duplicate(String),

    #[error("user:{0} not found")]
    NotFound(String),

    #[error("engineer '{username}' was modified concurrently (expected version {expected})")]
    VersionMismatch { username: String, expected: i64 },

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Read access plus transaction factory for engineer records.
///
/// Scoped lookups (`find`, `get`) only see active rows. `get_unscoped` also
/// returns soft-deleted rows and exists for the username uniqueness check.
#[async_trait]
pub trait EngineerStore: Send + Sync {
    async fn find(&self, filter: &EngineerFilter) -> Result<Vec<Engineer>, StoreError>;

    async fn get(&self, username: &str) -> Result<Option<Engineer>, StoreError>;

    async fn get_unscoped(&self, username: &str) -> Result<Option<Engineer>, StoreError>;

    async fn begin(&self) -> Result<Box<dyn EngineerSession>, StoreError>;
}

/// A write transaction scoped to a single handler invocation.
///
/// Writes stamp server-assigned fields onto the passed record on success.
/// `update` and `delete` only apply when the stored version still equals
/// `engineer.version`; otherwise they fail with `VersionMismatch`.
#[async_trait]
pub trait EngineerSession: Send {
    /// Insert a new row with `version = 1` and fresh timestamps.
    async fn insert(&mut self, engineer: &mut Engineer) -> Result<(), StoreError>;

    /// Persist the profile fields of an active row keyed by username.
    async fn update(&mut self, engineer: &mut Engineer) -> Result<(), StoreError>;

    /// Soft delete an active row keyed by username.
    async fn delete(&mut self, engineer: &mut Engineer) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// Roll back after a failed write and hand back the original failure.
/// A rollback error is logged; the write error stays the one reported.
pub async fn abort(session: Box<dyn EngineerSession>, cause: StoreError) -> StoreError {
    if let Err(rollback_error) = session.rollback().await {
        tracing::error!("Rollback failed after '{}': {}", cause, rollback_error);
    }
    cause
}
