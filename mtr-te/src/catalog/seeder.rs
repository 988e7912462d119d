//! Catalog population from a seed file
//!
//! The seed file is a JSON object keyed by genre:
//!
//! ```json
//! { "thrash": [ { "name": "Slayer", "genre": ["thrash"], "tier": "well-known" } ] }
//! ```
//!
//! Bands without an id get one derived from their name. A band listed under
//! several genres is stored once carrying every genre it was listed under.

use mtr_common::time::band_id_from_name;
use mtr_common::{Band, CatalogStore, Error, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// Seed catalog compiled into the binary
const BUILTIN_SEED: &str = include_str!("../../data/seed_bands.json");

#[derive(Debug, Clone, Default)]
pub struct CatalogSeeder {
    /// Lowercased genre -> seed bands
    bands_by_genre: HashMap<String, Vec<Band>>,
}

impl CatalogSeeder {
    /// Seeder with nothing to offer; population becomes a no-op
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_map(map: BTreeMap<String, Vec<Band>>) -> Self {
        // First pass: every genre a band id was listed under
        let mut listed_under: HashMap<String, Vec<String>> = HashMap::new();
        // Derived id -> first name that produced it
        let mut derived_from: HashMap<String, String> = HashMap::new();
        let mut normalized: Vec<(String, Vec<Band>)> = Vec::with_capacity(map.len());

        for (genre, bands) in map {
            let genre = genre.trim().to_ascii_lowercase();
            if genre.is_empty() {
                continue;
            }
            let mut prepared = Vec::with_capacity(bands.len());
            for mut band in bands {
                if band.name.trim().is_empty() {
                    continue;
                }
                if band.id.trim().is_empty() {
                    let Some(id) = band_id_from_name(&band.name) else {
                        warn!("Seed band {:?} has no usable id, skipping", band.name);
                        continue;
                    };
                    let first = derived_from.entry(id.clone()).or_insert_with(|| band.name.clone());
                    if !first.eq_ignore_ascii_case(&band.name) {
                        debug!(
                            "Seed bands {:?} and {:?} both derive id {}; the later one is dropped on population",
                            first, band.name, id
                        );
                    }
                    band.id = id;
                }
                band.genres.retain(|g| !g.trim().is_empty());
                let tags = listed_under.entry(band.id.clone()).or_default();
                if !tags.iter().any(|g| g.eq_ignore_ascii_case(&genre)) {
                    tags.push(genre.clone());
                }
                prepared.push(band);
            }
            normalized.push((genre, prepared));
        }

        // Second pass: make sure each band carries all of those genres
        let mut bands_by_genre = HashMap::with_capacity(normalized.len());
        for (genre, mut bands) in normalized {
            for band in &mut bands {
                if let Some(tags) = listed_under.get(&band.id) {
                    for tag in tags {
                        if !band.has_genre(tag) {
                            band.genres.push(tag.clone());
                        }
                    }
                }
            }
            bands_by_genre
                .entry(genre)
                .or_insert_with(Vec::new)
                .extend(bands);
        }

        Self { bands_by_genre }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let map: BTreeMap<String, Vec<Band>> = serde_json::from_str(json)?;
        Ok(Self::from_map(map))
    }

    /// Seeder over the bundled band list
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_SEED)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read seed file {} failed: {}", path.display(), e)))?;
        let seeder = Self::from_json_str(&content)
            .map_err(|e| Error::Config(format!("Parse seed file {} failed: {}", path.display(), e)))?;
        info!(
            "Loaded seed file {} ({} genres, {} bands)",
            path.display(),
            seeder.bands_by_genre.len(),
            seeder.band_count()
        );
        Ok(seeder)
    }

    pub fn genres(&self) -> Vec<&str> {
        let mut genres: Vec<&str> = self.bands_by_genre.keys().map(String::as_str).collect();
        genres.sort_unstable();
        genres
    }

    pub fn band_count(&self) -> usize {
        self.bands_by_genre.values().map(Vec::len).sum()
    }

    pub fn seed_bands(&self, genre: &str) -> &[Band] {
        self.bands_by_genre
            .get(&genre.trim().to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Insert the seed bands of `genre` whose names the catalog does not yet
    /// hold for that genre. Returns how many were added.
    pub async fn populate_genre(&self, catalog: &dyn CatalogStore, genre: &str) -> Result<usize> {
        let seed = self.seed_bands(genre);
        if seed.is_empty() {
            debug!("No seed bands for genre {}", genre);
            return Ok(0);
        }

        let existing = catalog.bands_by_genre(genre).await?;
        let mut known_names: HashSet<String> =
            existing.iter().map(|b| b.name.to_ascii_lowercase()).collect();

        let mut added = 0;
        for band in seed {
            if !known_names.insert(band.name.to_ascii_lowercase()) {
                continue;
            }
            if catalog.create_band(band).await? {
                added += 1;
            }
        }

        if added > 0 {
            info!("Populated genre {} with {} bands", genre, added);
        } else {
            debug!("Genre {} already fully populated", genre);
        }
        Ok(added)
    }

    /// Populate each genre in turn; returns the total added
    pub async fn populate_all(&self, catalog: &dyn CatalogStore, genres: &[String]) -> Result<usize> {
        let mut total = 0;
        for genre in genres {
            total += self.populate_genre(catalog, genre).await?;
        }
        Ok(total)
    }
}
