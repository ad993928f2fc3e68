//! PgEntityStore: keyed JSONB records backed by Postgres.
//!
//! One table holds every record kind. `save` is a full-row upsert on
//! `(kind, id)`; there are no partial updates.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use plasma_common::EntityKind;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::debug;

use crate::store::EntityStore;

/// A record as stored in Postgres, with the time of its last write.
#[derive(Debug, Clone)]
pub struct StoredEntity {
    pub kind: String,
    pub id: String,
    pub payload: serde_json::Value,
    pub written_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StoredEntity {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> sqlx::Result<Self> {
        use sqlx::Row;
        Ok(Self {
            kind: row.try_get("kind")?,
            id: row.try_get("id")?,
            payload: row.try_get("payload")?,
            written_at: row.try_get("written_at")?,
        })
    }
}

// ---------------------------------------------------------------------------
// PgEntityStore
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect with a bounded pool.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to connect to Postgres")?;
        Ok(Self::new(pool))
    }

    /// Create the records table if it does not exist. Safe to run on every start.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS entities (
                kind        TEXT         NOT NULL,
                id          TEXT         NOT NULL,
                payload     JSONB        NOT NULL,
                written_at  TIMESTAMPTZ  NOT NULL DEFAULT now(),
                PRIMARY KEY (kind, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        debug!("entities table ready");
        Ok(())
    }

    /// Number of records of one kind.
    pub async fn count(&self, kind: EntityKind) -> Result<i64> {
        let row = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM entities WHERE kind = $1")
            .bind(kind.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.0)
    }

    /// Every record of one kind, ordered by id.
    pub async fn read_kind(&self, kind: EntityKind) -> Result<Vec<StoredEntity>> {
        let rows = sqlx::query_as::<_, StoredEntity>(
            r#"
            SELECT kind, id, payload, written_at
            FROM entities
            WHERE kind = $1
            ORDER BY id ASC
            "#,
        )
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl EntityStore for PgEntityStore {
    async fn load(&self, kind: EntityKind, id: &str) -> Result<Option<serde_json::Value>> {
        let row = sqlx::query_as::<_, (serde_json::Value,)>(
            "SELECT payload FROM entities WHERE kind = $1 AND id = $2",
        )
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.0))
    }

    async fn save(&self, kind: EntityKind, id: &str, record: serde_json::Value) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO entities (kind, id, payload, written_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (kind, id)
            DO UPDATE SET payload = EXCLUDED.payload, written_at = EXCLUDED.written_at
            "#,
        )
        .bind(kind.as_str())
        .bind(id)
        .bind(&record)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
