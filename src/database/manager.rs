use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::store::StoreError;

/// Table backing the engineer store. Soft-deleted rows stay in place with
/// `deleted_at` set so usernames remain reserved.
const CREATE_ENGINEER_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS engineer (
        username    TEXT PRIMARY KEY,
        first_name  TEXT NOT NULL DEFAULT '',
        last_name   TEXT NOT NULL DEFAULT '',
        city        TEXT NOT NULL DEFAULT '',
        division    TEXT NOT NULL DEFAULT '',
        position    TEXT NOT NULL DEFAULT '',
        created_at  TIMESTAMPTZ NOT NULL,
        updated_at  TIMESTAMPTZ NOT NULL,
        deleted_at  TIMESTAMPTZ NULL,
        version     BIGINT NOT NULL DEFAULT 1
    )
"#;

/// Connection pool owner for the Postgres-backed store
pub struct DatabaseManager {
    pool: PgPool,
}

impl DatabaseManager {
    /// Open the pool and make sure the engineer table exists
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let target = Self::redacted_url(&config.url)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await?;
        info!("Connected database pool: {}", target);

        sqlx::query(CREATE_ENGINEER_TABLE).execute(&pool).await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> PgPool {
        self.pool.clone()
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }

    /// Connection URL without the password, safe for logs
    fn redacted_url(raw: &str) -> Result<String, StoreError> {
        let mut url = url::Url::parse(raw).map_err(|_| StoreError::InvalidDatabaseUrl)?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(StoreError::InvalidDatabaseUrl);
        }
        if url.password().is_some() {
            url.set_password(Some("****"))
                .map_err(|_| StoreError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }
}
