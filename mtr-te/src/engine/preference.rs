//! Preference model
//!
//! Genre weights only grow: every recorded choice adds one to each genre tag
//! of the chosen band. Scores are plain sums of those weights.

use mtr_common::{Band, Comparison, PairKey, PreferenceWeights, Session, Skip};

use super::{ExploreError, ExploreResult};

/// Check the shape of a comparison without looking at session history
pub fn validate_selection(band_id_1: &str, band_id_2: &str, selected_band_id: &str) -> ExploreResult<()> {
    if band_id_1.is_empty() || band_id_2.is_empty() || selected_band_id.is_empty() {
        return Err(ExploreError::InvalidComparison(
            "band ids must not be empty".to_string(),
        ));
    }
    if band_id_1 == band_id_2 {
        return Err(ExploreError::InvalidComparison(format!(
            "band {} cannot be compared with itself",
            band_id_1
        )));
    }
    if selected_band_id != band_id_1 && selected_band_id != band_id_2 {
        return Err(ExploreError::InvalidComparison(format!(
            "selected band {} is not part of the pair {} / {}",
            selected_band_id, band_id_1, band_id_2
        )));
    }
    Ok(())
}

/// Append a comparison and credit the genres of the selected band.
///
/// `selected` must be the catalog record of `selected_band_id`. Nothing is
/// mutated when an error is returned.
pub fn record_comparison(
    session: &mut Session,
    band_id_1: &str,
    band_id_2: &str,
    selected: &Band,
) -> ExploreResult<()> {
    validate_selection(band_id_1, band_id_2, &selected.id)?;

    let key = PairKey::new(band_id_1, band_id_2);
    if session.has_comparison(&key) {
        return Err(ExploreError::InvalidComparison(format!(
            "pair {} / {} was already compared in session {}",
            band_id_1, band_id_2, session.id
        )));
    }

    session.comparisons.push(Comparison {
        band_id_1: band_id_1.to_string(),
        band_id_2: band_id_2.to_string(),
        selected_band_id: selected.id.clone(),
        timestamp: mtr_common::time::now(),
    });
    for genre in &selected.genres {
        session.preference_weights.increment(genre);
    }
    session.mark_seen(band_id_1);
    session.mark_seen(band_id_2);
    session.touch();
    Ok(())
}

/// Remember a pair the user declined to judge; weights are untouched
pub fn record_skip(session: &mut Session, band_id_1: &str, band_id_2: &str) -> ExploreResult<()> {
    if band_id_1.is_empty() || band_id_2.is_empty() {
        return Err(ExploreError::InvalidComparison(
            "band ids must not be empty".to_string(),
        ));
    }
    if band_id_1 == band_id_2 {
        return Err(ExploreError::InvalidComparison(format!(
            "band {} cannot be skipped against itself",
            band_id_1
        )));
    }

    session.skips.push(Skip {
        band_id_1: band_id_1.to_string(),
        band_id_2: band_id_2.to_string(),
        timestamp: mtr_common::time::now(),
    });
    session.mark_seen(band_id_1);
    session.mark_seen(band_id_2);
    session.touch();
    Ok(())
}

/// Sum of the weights of the band's genre tags
pub fn score_band(band: &Band, weights: &PreferenceWeights) -> u32 {
    band.genres
        .iter()
        .fold(0u32, |total, genre| total.saturating_add(weights.get(genre)))
}
