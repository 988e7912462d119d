//! Band catalog database operations

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;
use tracing::debug;

use crate::db::models::{Band, Tier};
use crate::store::{validate_band, CatalogStore};
use crate::Result;

/// Catalog backed by the `bands` and `band_genres` tables
#[derive(Clone)]
pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

impl SqliteCatalogStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const BAND_COLUMNS: &str = r#"
    b.id, b.name, b.era, b.albums, b.description, b.style_notes, b.tier,
    (SELECT json_group_array(genre)
       FROM (SELECT genre FROM band_genres WHERE band_id = b.id ORDER BY position)) AS genres
"#;

fn band_from_row(row: &SqliteRow) -> Result<Band> {
    let albums: String = row.try_get("albums")?;
    let genres: String = row.try_get("genres")?;
    let tier: String = row.try_get("tier")?;

    Ok(Band {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        genres: serde_json::from_str(&genres)?,
        era: row.try_get("era")?,
        albums: serde_json::from_str(&albums)?,
        description: row.try_get("description")?,
        style_notes: row.try_get("style_notes")?,
        tier: Tier::parse_lenient(&tier),
    })
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn bands_by_genre(&self, genre: &str) -> Result<Vec<Band>> {
        let sql = format!(
            r#"
            SELECT {BAND_COLUMNS}
            FROM bands b
            WHERE EXISTS (
                SELECT 1 FROM band_genres g WHERE g.band_id = b.id AND g.genre = ?
            )
            ORDER BY b.name COLLATE NOCASE, b.id
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(genre.trim())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(band_from_row).collect()
    }

    async fn band(&self, id: &str) -> Result<Option<Band>> {
        let sql = format!("SELECT {BAND_COLUMNS} FROM bands b WHERE b.id = ?");

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(band_from_row).transpose()
    }

    async fn create_band(&self, band: &Band) -> Result<bool> {
        validate_band(band)?;

        // Prepare JSON before opening the transaction
        let albums = serde_json::to_string(&band.albums)?;

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO bands (id, name, era, albums, description, style_notes, tier)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&band.id)
        .bind(&band.name)
        .bind(&band.era)
        .bind(&albums)
        .bind(&band.description)
        .bind(&band.style_notes)
        .bind(band.tier.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            tx.rollback().await?;
            debug!("Band {} already in catalog, skipping", band.id);
            return Ok(false);
        }

        for (position, genre) in band.genres.iter().enumerate() {
            let genre = genre.trim();
            if genre.is_empty() {
                continue;
            }
            sqlx::query(
                "INSERT OR IGNORE INTO band_genres (band_id, genre, position) VALUES (?, ?, ?)",
            )
            .bind(&band.id)
            .bind(genre)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn genre_counts(&self) -> Result<BTreeMap<String, u64>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT lower(genre) AS tag, COUNT(DISTINCT band_id)
            FROM band_genres
            GROUP BY tag
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(genre, count)| (genre, count.max(0) as u64))
            .collect())
    }
}
