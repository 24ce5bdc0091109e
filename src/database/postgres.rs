use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::database::models::{Engineer, EngineerFilter};
use crate::database::store::{EngineerSession, EngineerStore, StoreError};

const SELECT_ENGINEER: &str = "SELECT username, first_name, last_name, city, division, position, \
     created_at, updated_at, deleted_at, version FROM engineer";

const GET_ACTIVE: &str = "SELECT username, first_name, last_name, city, division, position, \
     created_at, updated_at, deleted_at, version FROM engineer \
     WHERE username = $1 AND deleted_at IS NULL";

const GET_UNSCOPED: &str = "SELECT username, first_name, last_name, city, division, position, \
     created_at, updated_at, deleted_at, version FROM engineer WHERE username = $1";

const INSERT: &str = "INSERT INTO engineer \
     (username, first_name, last_name, city, division, position, created_at, updated_at, deleted_at, version) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $7, NULL, 1)";

const UPDATE: &str = "UPDATE engineer \
     SET first_name = $2, last_name = $3, city = $4, division = $5, position = $6, \
         updated_at = $7, version = version + 1 \
     WHERE username = $1 AND version = $8 AND deleted_at IS NULL \
     RETURNING username, first_name, last_name, city, division, position, \
               created_at, updated_at, deleted_at, version";

const SOFT_DELETE: &str = "UPDATE engineer \
     SET deleted_at = $2, version = version + 1 \
     WHERE username = $1 AND version = $3 AND deleted_at IS NULL \
     RETURNING username, first_name, last_name, city, division, position, \
               created_at, updated_at, deleted_at, version";

/// Engineer store on a shared Postgres pool
#[derive(Clone)]
pub struct PgEngineerStore {
    pool: PgPool,
}

impl PgEngineerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EngineerStore for PgEngineerStore {
    async fn find(&self, filter: &EngineerFilter) -> Result<Vec<Engineer>, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new(SELECT_ENGINEER);
        query.push(" WHERE deleted_at IS NULL");

        for (column, value) in [
            ("city", &filter.city),
            ("division", &filter.division),
            ("position", &filter.position),
        ] {
            if let Some(value) = value {
                query.push(format!(" AND {} = ", column)).push_bind(value.clone());
            }
        }
        query.push(" ORDER BY created_at, username");

        let rows = query.build_query_as::<Engineer>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn get(&self, username: &str) -> Result<Option<Engineer>, StoreError> {
        let row = sqlx::query_as::<_, Engineer>(GET_ACTIVE)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_unscoped(&self, username: &str) -> Result<Option<Engineer>, StoreError> {
        let row = sqlx::query_as::<_, Engineer>(GET_UNSCOPED)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn begin(&self) -> Result<Box<dyn EngineerSession>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgSession { tx }))
    }
}

/// Open Postgres transaction. Dropping it without commit rolls back.
pub struct PgSession {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl EngineerSession for PgSession {
    async fn insert(&mut self, engineer: &mut Engineer) -> Result<(), StoreError> {
        let now = Utc::now();
        let result = sqlx::query(INSERT)
            .bind(&engineer.username)
            .bind(&engineer.first_name)
            .bind(&engineer.last_name)
            .bind(&engineer.city)
            .bind(&engineer.division)
            .bind(&engineer.position)
            .bind(now)
            .execute(&mut *self.tx)
            .await;

        match result {
            Ok(_) => {
                engineer.created_at = now;
                engineer.updated_at = now;
                engineer.deleted_at = None;
                engineer.version = 1;
                Ok(())
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Duplicate(engineer.username.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&mut self, engineer: &mut Engineer) -> Result<(), StoreError> {
        let row = sqlx::query_as::<_, Engineer>(UPDATE)
            .bind(&engineer.username)
            .bind(&engineer.first_name)
            .bind(&engineer.last_name)
            .bind(&engineer.city)
            .bind(&engineer.division)
            .bind(&engineer.position)
            .bind(Utc::now())
            .bind(engineer.version)
            .fetch_optional(&mut *self.tx)
            .await?;

        store_returned(engineer, row)
    }

    async fn delete(&mut self, engineer: &mut Engineer) -> Result<(), StoreError> {
        let row = sqlx::query_as::<_, Engineer>(SOFT_DELETE)
            .bind(&engineer.username)
            .bind(Utc::now())
            .bind(engineer.version)
            .fetch_optional(&mut *self.tx)
            .await?;

        store_returned(engineer, row)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let PgSession { tx } = *self;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        let PgSession { tx } = *self;
        tx.rollback().await?;
        Ok(())
    }
}

/// A guarded UPDATE that matched no row means the version moved or the row
/// was deleted underneath us.
fn store_returned(engineer: &mut Engineer, row: Option<Engineer>) -> Result<(), StoreError> {
    match row {
        Some(row) => {
            *engineer = row;
            Ok(())
        }
        None => Err(StoreError::VersionMismatch {
            username: engineer.username.clone(),
            expected: engineer.version,
        }),
    }
}
