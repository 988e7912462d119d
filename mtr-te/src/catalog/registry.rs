//! Configured genres and which of them have enough bands to explore

use mtr_common::{CatalogStore, Result};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreInfo {
    pub name: String,
    pub band_count: u64,
}

#[derive(Debug, Clone)]
pub struct GenreRegistry {
    genres: Vec<String>,
    min_bands: u64,
}

impl GenreRegistry {
    /// Genres are lowercased; blanks and repeats are dropped
    pub fn new(genres: &[String], min_bands: u64) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(genres.len());
        for genre in genres {
            let genre = genre.trim().to_ascii_lowercase();
            if !genre.is_empty() && !unique.contains(&genre) {
                unique.push(genre);
            }
        }
        Self {
            genres: unique,
            min_bands,
        }
    }

    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    /// Every configured genre with its live band count, in configured order
    pub async fn with_counts(&self, catalog: &dyn CatalogStore) -> Result<Vec<GenreInfo>> {
        let counts = catalog.genre_counts().await?;
        Ok(self
            .genres
            .iter()
            .map(|genre| GenreInfo {
                name: genre.clone(),
                band_count: counts.get(genre).copied().unwrap_or(0),
            })
            .collect())
    }

    /// Configured genres holding at least the minimum number of bands
    pub async fn offered(&self, catalog: &dyn CatalogStore) -> Result<Vec<GenreInfo>> {
        Ok(self
            .with_counts(catalog)
            .await?
            .into_iter()
            .filter(|info| info.band_count >= self.min_bands)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtr_common::{Band, MemoryCatalogStore, Tier};

    fn bands(genre: &str, count: usize) -> Vec<Band> {
        (0..count)
            .map(|i| {
                let id = format!("band_{}_{}", genre, i);
                Band::new(id.clone(), id, &[genre], Tier::Popular)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_offered_filters_by_minimum_in_configured_order() {
        let mut all = bands("doom", 5);
        all.extend(bands("Thrash", 6));
        all.extend(bands("folk", 2));
        let catalog = MemoryCatalogStore::with_bands(all);

        let genres: Vec<String> = ["thrash", "folk", "Doom", "thrash", " "]
            .iter()
            .map(|g| g.to_string())
            .collect();
        let registry = GenreRegistry::new(&genres, 5);
        assert_eq!(registry.genres(), &["thrash", "folk", "doom"]);

        let offered = registry.offered(&catalog).await.unwrap();
        assert_eq!(
            offered,
            vec![
                GenreInfo { name: "thrash".into(), band_count: 6 },
                GenreInfo { name: "doom".into(), band_count: 5 },
            ]
        );

        let all = registry.with_counts(&catalog).await.unwrap();
        assert_eq!(all[1], GenreInfo { name: "folk".into(), band_count: 2 });
    }
}
