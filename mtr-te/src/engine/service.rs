//! Session-scoped exploration service
//!
//! Ties the stores to the engine: loads a session, runs the pure engine
//! functions over it and writes it back. Writes to one session are
//! serialized through a per-session async lock so concurrent requests
//! cannot lose each other's history.

use chrono::{DateTime, Utc};
use mtr_common::{Band, CatalogStore, PreferenceWeights, Recommendation, Session, SessionStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info};

use super::pair_selector::{PairOutcome, PairSelector};
use super::{picks, preference, ranker, ExploreError, ExploreResult};
use crate::catalog::{CatalogSeeder, GenreInfo, GenreRegistry};
use crate::config::ExplorerConfig;

/// Counts and weights of a session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub genre: String,
    pub comparison_count: usize,
    pub skip_count: usize,
    pub seen_count: usize,
    pub preference_weights: PreferenceWeights,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Session> for SessionSummary {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id.clone(),
            genre: session.genre.clone(),
            comparison_count: session.comparisons.len(),
            skip_count: session.skips.len(),
            seen_count: session.seen_bands.len(),
            preference_weights: session.preference_weights.clone(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

#[derive(Default)]
struct SessionLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SessionLocks {
    async fn acquire(&self, session_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries only the map still references are idle
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(session_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

pub struct TasteExplorer {
    catalog: Arc<dyn CatalogStore>,
    sessions: Arc<dyn SessionStore>,
    seeder: CatalogSeeder,
    registry: GenreRegistry,
    selector: PairSelector,
    config: ExplorerConfig,
    rng: Mutex<StdRng>,
    locks: SessionLocks,
}

impl TasteExplorer {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        sessions: Arc<dyn SessionStore>,
        seeder: CatalogSeeder,
        config: ExplorerConfig,
    ) -> Self {
        let registry = GenreRegistry::new(&config.genres, config.min_bands_per_genre);
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            catalog,
            sessions,
            seeder,
            registry,
            selector: config.pair_selector(),
            config,
            rng: Mutex::new(rng),
            locks: SessionLocks::default(),
        }
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Populate every configured genre from the seeder
    pub async fn populate_configured_genres(&self) -> ExploreResult<usize> {
        let added = self
            .seeder
            .populate_all(self.catalog.as_ref(), self.registry.genres())
            .await?;
        info!(
            "Catalog population added {} bands across {} genres",
            added,
            self.registry.genres().len()
        );
        Ok(added)
    }

    /// Genres with enough bands to explore
    pub async fn genres(&self) -> ExploreResult<Vec<GenreInfo>> {
        Ok(self.registry.offered(self.catalog.as_ref()).await?)
    }

    pub async fn start_session(&self, genre: &str) -> ExploreResult<Session> {
        let genre = genre.trim().to_ascii_lowercase();
        if genre.is_empty() {
            return Err(ExploreError::InvalidInput("genre is required".to_string()));
        }

        let added = self.seeder.populate_genre(self.catalog.as_ref(), &genre).await?;
        let session = Session::new(genre);
        self.sessions.create_session(&session).await?;

        info!(
            "Started session {} for genre {} ({} bands added)",
            session.id, session.genre, added
        );
        Ok(session)
    }

    async fn load_session(&self, session_id: &str) -> ExploreResult<Session> {
        self.sessions
            .session(session_id)
            .await?
            .ok_or_else(|| ExploreError::SessionNotFound(session_id.to_string()))
    }

    /// Catalog records of a judged pair; both must carry the session genre
    async fn pair_bands(
        &self,
        session: &Session,
        band_id_1: &str,
        band_id_2: &str,
    ) -> ExploreResult<(Band, Band)> {
        let band1 = self.genre_band(session, band_id_1).await?;
        let band2 = self.genre_band(session, band_id_2).await?;
        Ok((band1, band2))
    }

    async fn genre_band(&self, session: &Session, band_id: &str) -> ExploreResult<Band> {
        match self.catalog.band(band_id).await? {
            Some(band) if band.has_genre(&session.genre) => Ok(band),
            Some(_) => Err(ExploreError::InvalidComparison(format!(
                "band {} is not in genre {}",
                band_id, session.genre
            ))),
            None => Err(ExploreError::InvalidComparison(format!(
                "unknown band {}",
                band_id
            ))),
        }
    }

    /// Next pair to compare, or `Exhausted` once no unused pair is found
    pub async fn next_pair(&self, session_id: &str) -> ExploreResult<PairOutcome> {
        let session = self.load_session(session_id).await?;

        let mut bands = self.catalog.bands_by_genre(&session.genre).await?;
        if bands.len() < 2 {
            debug!(
                "Genre {} has {} bands; populating before selection",
                session.genre,
                bands.len()
            );
            self.seeder
                .populate_genre(self.catalog.as_ref(), &session.genre)
                .await?;
            bands = self.catalog.bands_by_genre(&session.genre).await?;
        }

        let compared = session.compared_pairs(self.config.skip_policy);
        let outcome = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            self.selector
                .select(&session.genre, &bands, &compared, &mut *rng)?
        };

        if outcome == PairOutcome::Exhausted {
            info!(
                "Session {} has no unused pairs left ({} comparisons, {} skips)",
                session.id,
                session.comparisons.len(),
                session.skips.len()
            );
        }
        Ok(outcome)
    }

    pub async fn record_preference(
        &self,
        session_id: &str,
        band_id_1: &str,
        band_id_2: &str,
        selected_band_id: &str,
    ) -> ExploreResult<SessionSummary> {
        preference::validate_selection(band_id_1, band_id_2, selected_band_id)?;

        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load_session(session_id).await?;

        let (band1, band2) = self.pair_bands(&session, band_id_1, band_id_2).await?;
        let selected = if selected_band_id == band1.id { &band1 } else { &band2 };
        preference::record_comparison(&mut session, band_id_1, band_id_2, selected)?;
        self.sessions.update_session(&session).await?;

        debug!(
            "Session {} preferred {} over {}",
            session.id,
            selected_band_id,
            if selected_band_id == band_id_1 { band_id_2 } else { band_id_1 }
        );
        Ok(SessionSummary::from(&session))
    }

    pub async fn record_skip(
        &self,
        session_id: &str,
        band_id_1: &str,
        band_id_2: &str,
    ) -> ExploreResult<SessionSummary> {
        let _guard = self.locks.acquire(session_id).await;
        let mut session = self.load_session(session_id).await?;

        self.pair_bands(&session, band_id_1, band_id_2).await?;
        preference::record_skip(&mut session, band_id_1, band_id_2)?;
        self.sessions.update_session(&session).await?;

        debug!("Session {} skipped {} / {}", session.id, band_id_1, band_id_2);
        Ok(SessionSummary::from(&session))
    }

    /// Lightweight top-`count` suggestions
    pub async fn suggestions(&self, session_id: &str, count: usize) -> ExploreResult<Vec<Recommendation>> {
        let session = self.load_session(session_id).await?;
        let bands = self.catalog.bands_by_genre(&session.genre).await?;
        let exclude = session.compared_band_ids();
        Ok(ranker::suggest(
            &bands,
            &session.preference_weights,
            &exclude,
            count,
        ))
    }

    /// Tier-diversified recommendations, at most `max_recommendations`
    pub async fn recommendations(&self, session_id: &str) -> ExploreResult<Vec<Recommendation>> {
        let session = self.load_session(session_id).await?;
        let bands = self.catalog.bands_by_genre(&session.genre).await?;
        let exclude = session.compared_band_ids();
        let recommendations = ranker::rank(
            &bands,
            &session.preference_weights,
            &exclude,
            self.config.max_recommendations,
        );
        debug!(
            "Session {}: {} recommendations from {} bands ({} excluded)",
            session.id,
            recommendations.len(),
            bands.len(),
            exclude.len()
        );
        Ok(recommendations)
    }

    pub async fn session_summary(&self, session_id: &str) -> ExploreResult<SessionSummary> {
        let session = self.load_session(session_id).await?;
        Ok(SessionSummary::from(&session))
    }

    /// Top bands of a genre by catalog metadata alone
    pub async fn catalog_picks(&self, genre: &str) -> ExploreResult<Vec<Band>> {
        let genre = genre.trim();
        if genre.is_empty() {
            return Err(ExploreError::InvalidInput("genre is required".to_string()));
        }
        let bands = self.catalog.bands_by_genre(genre).await?;
        Ok(picks::catalog_picks(&bands, self.config.picks_limit))
    }
}
