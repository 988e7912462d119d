//! In-memory catalog and session stores
//!
//! Owned by whoever constructs them and dropped with their owner; there is no
//! process-wide instance.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::{validate_band, CatalogStore, SessionStore};
use crate::db::models::{Band, Session};
use crate::{Error, Result};

#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    bands: RwLock<Vec<Band>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with bands; later duplicates of an id are dropped.
    pub fn with_bands(bands: impl IntoIterator<Item = Band>) -> Self {
        let mut unique: Vec<Band> = Vec::new();
        for band in bands {
            if !unique.iter().any(|b| b.id == band.id) {
                unique.push(band);
            }
        }
        Self {
            bands: RwLock::new(unique),
        }
    }

    pub async fn len(&self) -> usize {
        self.bands.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bands.read().await.is_empty()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn bands_by_genre(&self, genre: &str) -> Result<Vec<Band>> {
        let bands = self.bands.read().await;
        let mut matching: Vec<Band> = bands.iter().filter(|b| b.has_genre(genre)).cloned().collect();
        matching.sort_by(|a, b| {
            a.name
                .to_ascii_lowercase()
                .cmp(&b.name.to_ascii_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(matching)
    }

    async fn band(&self, id: &str) -> Result<Option<Band>> {
        Ok(self.bands.read().await.iter().find(|b| b.id == id).cloned())
    }

    async fn create_band(&self, band: &Band) -> Result<bool> {
        validate_band(band)?;
        let mut bands = self.bands.write().await;
        if bands.iter().any(|b| b.id == band.id) {
            return Ok(false);
        }
        bands.push(band.clone());
        Ok(true)
    }

    async fn genre_counts(&self) -> Result<BTreeMap<String, u64>> {
        let bands = self.bands.read().await;
        let mut counts = BTreeMap::new();
        for band in bands.iter() {
            let mut tags: Vec<String> = band.genres.iter().map(|g| g.to_ascii_lowercase()).collect();
            tags.sort();
            tags.dedup();
            for tag in tags {
                *counts.entry(tag).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create_session(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(Error::InvalidInput(format!(
                "session {} already exists",
                session.id
            )));
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn session(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn update_session(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.id) {
            Some(stored) => {
                *stored = session.clone();
                Ok(())
            }
            None => Err(Error::NotFound(format!("session {}", session.id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Tier;

    #[tokio::test]
    async fn test_create_band_is_idempotent_on_id() {
        let store = MemoryCatalogStore::new();
        let band = Band::new("b1", "Slayer", &["thrash"], Tier::WellKnown);

        assert!(store.create_band(&band).await.unwrap());
        assert!(!store.create_band(&band).await.unwrap());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_bands_by_genre_is_case_insensitive_and_sorted() {
        let store = MemoryCatalogStore::with_bands([
            Band::new("b2", "testament", &["Thrash"], Tier::WellKnown),
            Band::new("b1", "Anthrax", &["thrash", "speed"], Tier::WellKnown),
            Band::new("b3", "Candlemass", &["doom"], Tier::WellKnown),
        ]);

        let thrash = store.bands_by_genre("THRASH").await.unwrap();
        let names: Vec<&str> = thrash.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Anthrax", "testament"]);

        let counts = store.genre_counts().await.unwrap();
        assert_eq!(counts.get("thrash"), Some(&2));
        assert_eq!(counts.get("speed"), Some(&1));
        assert_eq!(counts.get("doom"), Some(&1));
    }

    #[tokio::test]
    async fn test_band_without_genres_is_rejected() {
        let store = MemoryCatalogStore::new();
        let band = Band::new("b1", "Nameless", &[], Tier::Niche);
        assert!(matches!(
            store.create_band(&band).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_update_unknown_session_is_not_found() {
        let store = MemorySessionStore::new();
        let session = Session::new("black");
        assert!(matches!(
            store.update_session(&session).await,
            Err(Error::NotFound(_))
        ));

        store.create_session(&session).await.unwrap();
        let mut changed = session.clone();
        changed.mark_seen("band_mayhem");
        store.update_session(&changed).await.unwrap();

        let loaded = store.session(&session.id).await.unwrap().unwrap();
        assert!(loaded.seen_bands.contains("band_mayhem"));
    }
}
