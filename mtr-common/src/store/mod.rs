//! Store traits for the band catalog and exploration sessions
//!
//! Both are injected into the services as `Arc<dyn ...>`; the SQLite
//! implementations live in [`crate::db`], the in-memory ones in [`memory`].

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::db::models::{Band, Session};
use crate::Result;

pub mod memory;

pub use memory::{MemoryCatalogStore, MemorySessionStore};

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Returns every band tagged with the genre (case-insensitive),
    /// ordered by name.
    async fn bands_by_genre(&self, genre: &str) -> Result<Vec<Band>>;

    /// Returns Ok(None) if no band has this id.
    async fn band(&self, id: &str) -> Result<Option<Band>>;

    /// Inserts a band. Returns false, without touching the stored record,
    /// when a band with the same id already exists.
    async fn create_band(&self, band: &Band) -> Result<bool>;

    /// Live band count per lowercased genre tag.
    async fn genre_counts(&self) -> Result<BTreeMap<String, u64>>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, session: &Session) -> Result<()>;

    /// Returns Ok(None) if the session does not exist.
    async fn session(&self, id: &str) -> Result<Option<Session>>;

    /// Replaces the stored session. Err(NotFound) for an unknown id.
    async fn update_session(&self, session: &Session) -> Result<()>;
}

/// Rejects bands the catalog must never hold
pub(crate) fn validate_band(band: &Band) -> Result<()> {
    if band.id.trim().is_empty() {
        return Err(crate::Error::InvalidInput(format!(
            "band '{}' has an empty id",
            band.name
        )));
    }
    if band.genres.iter().all(|g| g.trim().is_empty()) {
        return Err(crate::Error::InvalidInput(format!(
            "band '{}' has no genre tags",
            band.id
        )));
    }
    Ok(())
}
