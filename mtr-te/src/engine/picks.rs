//! Session-independent top list for a genre
//!
//! Scores bands from catalog metadata alone: discography size, a classic-era
//! bonus and how much there is to read about them.

use mtr_common::Band;

pub const DEFAULT_PICKS_LIMIT: usize = 10;

const POINTS_PER_ALBUM: f64 = 2.0;
const CLASSIC_ERA_BONUS: f64 = 5.0;
const DESCRIPTION_CHARS_PER_POINT: f64 = 50.0;
const DESCRIPTION_MAX_POINTS: f64 = 10.0;

fn is_classic_era(era: &str) -> bool {
    era.contains("1980") || era.contains("1990")
}

pub fn catalog_score(band: &Band) -> f64 {
    let albums = band.albums.len() as f64 * POINTS_PER_ALBUM;
    let era = if is_classic_era(&band.era) {
        CLASSIC_ERA_BONUS
    } else {
        0.0
    };
    let description = (band.description.chars().count() as f64 / DESCRIPTION_CHARS_PER_POINT)
        .min(DESCRIPTION_MAX_POINTS);
    albums + era + description
}

/// Highest catalog scores first; equal scores keep input order
pub fn catalog_picks(bands: &[Band], limit: usize) -> Vec<Band> {
    let mut scored: Vec<(f64, &Band)> = bands.iter().map(|b| (catalog_score(b), b)).collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, band)| band.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtr_common::Tier;

    fn band(id: &str, albums: usize, era: &str, description_len: usize) -> Band {
        let mut band = Band::new(id, id, &["heavy"], Tier::Popular);
        band.albums = (0..albums).map(|i| format!("Album {}", i)).collect();
        band.era = era.to_string();
        band.description = "x".repeat(description_len);
        band
    }

    #[test]
    fn test_catalog_score_components() {
        assert_eq!(catalog_score(&band("a", 3, "", 0)), 6.0);
        assert_eq!(catalog_score(&band("b", 0, "1980s", 0)), 5.0);
        assert_eq!(catalog_score(&band("c", 0, "late 1990s", 0)), 5.0);
        assert_eq!(catalog_score(&band("d", 0, "2000s", 0)), 0.0);
        assert_eq!(catalog_score(&band("e", 0, "", 125)), 2.5);
        assert_eq!(catalog_score(&band("f", 0, "", 5000)), 10.0);
    }

    #[test]
    fn test_catalog_picks_orders_and_limits() {
        let bands = vec![
            band("sparse", 1, "2010s", 10),
            band("classic", 4, "1980s", 200),
            band("tie_first", 2, "", 0),
            band("tie_second", 2, "", 0),
        ];
        let picks = catalog_picks(&bands, 3);
        let ids: Vec<&str> = picks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["classic", "tie_first", "tie_second"]);

        assert!(catalog_picks(&[], DEFAULT_PICKS_LIMIT).is_empty());
    }
}
