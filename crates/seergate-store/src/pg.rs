//! `PostgreSQL` implementation of the `SessionStore` port.
//!
//! One row per session code, last write wins. The payload column carries
//! the save payload verbatim as JSONB.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use seergate_core::error::GateError;
use seergate_core::store::{SessionRow, SessionStore};

use crate::schema::CREATE_SESSIONS_TABLE;

/// PostgreSQL-backed session store.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Creates a new `PgSessionStore` over an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the sessions table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `GateError::Infrastructure` if the DDL fails.
    pub async fn ensure_schema(&self) -> Result<(), GateError> {
        sqlx::raw_sql(CREATE_SESSIONS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(infra)?;
        Ok(())
    }
}

fn infra(err: sqlx::Error) -> GateError {
    GateError::Infrastructure(format!("session store query failed: {err}"))
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn upsert(&self, code: &str, payload: &serde_json::Value) -> Result<(), GateError> {
        sqlx::query(
            r"
            INSERT INTO seer_sessions (code, payload, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            ON CONFLICT (code)
            DO UPDATE SET payload = EXCLUDED.payload, updated_at = NOW()
            ",
        )
        .bind(code)
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(infra)?;
        Ok(())
    }

    async fn fetch(&self, code: &str) -> Result<Option<SessionRow>, GateError> {
        let row = sqlx::query(
            r"
            SELECT code, payload, created_at, updated_at
            FROM seer_sessions
            WHERE code = $1
            ",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(infra)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let code: String = row.try_get("code").map_err(infra)?;
        let payload: serde_json::Value = row.try_get("payload").map_err(infra)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(infra)?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(infra)?;
        Ok(Some(SessionRow {
            code,
            payload,
            created_at,
            updated_at,
        }))
    }
}
