//! Exploration session database operations
//!
//! Histories, weights and the seen-set are stored as JSON columns; timestamps
//! as RFC 3339 text.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::db::models::Session;
use crate::store::SessionStore;
use crate::{Error, Result};

#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Serialized column values of a session
struct SessionColumns {
    comparison_history: String,
    skip_history: String,
    preference_weights: String,
    seen_bands: String,
    created_at: String,
    updated_at: String,
}

impl SessionColumns {
    fn from_session(session: &Session) -> Result<Self> {
        Ok(Self {
            comparison_history: serde_json::to_string(&session.comparisons)?,
            skip_history: serde_json::to_string(&session.skips)?,
            preference_weights: serde_json::to_string(&session.preference_weights)?,
            seen_bands: serde_json::to_string(&session.seen_bands)?,
            created_at: session.created_at.to_rfc3339(),
            updated_at: session.updated_at.to_rfc3339(),
        })
    }
}

fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", column, e)))
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn create_session(&self, session: &Session) -> Result<()> {
        let columns = SessionColumns::from_session(session)?;

        sqlx::query(
            r#"
            INSERT INTO sessions (
                id, genre, comparison_history, skip_history,
                preference_weights, seen_bands, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&session.id)
        .bind(&session.genre)
        .bind(&columns.comparison_history)
        .bind(&columns.skip_history)
        .bind(&columns.preference_weights)
        .bind(&columns.seen_bands)
        .bind(&columns.created_at)
        .bind(&columns.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn session(&self, id: &str) -> Result<Option<Session>> {
        let row = sqlx::query(
            r#"
            SELECT id, genre, comparison_history, skip_history,
                   preference_weights, seen_bands, created_at, updated_at
            FROM sessions
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let comparison_history: String = row.try_get("comparison_history")?;
        let skip_history: String = row.try_get("skip_history")?;
        let preference_weights: String = row.try_get("preference_weights")?;
        let seen_bands: String = row.try_get("seen_bands")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Some(Session {
            id: row.try_get("id")?,
            genre: row.try_get("genre")?,
            comparisons: serde_json::from_str(&comparison_history)?,
            skips: serde_json::from_str(&skip_history)?,
            preference_weights: serde_json::from_str(&preference_weights)?,
            seen_bands: serde_json::from_str(&seen_bands)?,
            created_at: parse_timestamp("created_at", &created_at)?,
            updated_at: parse_timestamp("updated_at", &updated_at)?,
        }))
    }

    async fn update_session(&self, session: &Session) -> Result<()> {
        let columns = SessionColumns::from_session(session)?;

        let updated = sqlx::query(
            r#"
            UPDATE sessions
            SET comparison_history = ?,
                skip_history = ?,
                preference_weights = ?,
                seen_bands = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&columns.comparison_history)
        .bind(&columns.skip_history)
        .bind(&columns.preference_weights)
        .bind(&columns.seen_bands)
        .bind(&columns.updated_at)
        .bind(&session.id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(Error::NotFound(format!("session {}", session.id)));
        }

        Ok(())
    }
}
