//! Recommendation ranking
//!
//! Both paths drop excluded bands, score the rest with the session weights
//! and sort by score. Sorting is stable, so equal scores keep catalog order.

use mtr_common::{Band, PreferenceWeights, Recommendation, Tier};
use std::collections::HashSet;

use super::preference::score_band;

const SUGGEST_BASE: f64 = 0.5;
const SUGGEST_STEP: f64 = 0.1;
const SUGGEST_CAP: f64 = 0.9;

const RANK_BASE: f64 = 0.6;
const RANK_STEP: f64 = 0.15;
const RANK_CAP: f64 = 0.95;

/// Well-known bands forced into every ranked list (when available)
pub const FORCED_WELL_KNOWN: usize = 2;
/// Popular bands forced into every ranked list (when available)
pub const FORCED_POPULAR: usize = 3;

pub const SUGGEST_MATCH_REASON: &str = "Based on your genre preferences";
pub const SUGGEST_DEFAULT_REASON: &str = "Popular band in this genre";
pub const RANK_MATCH_REASON: &str = "Based on your comparison preferences";
pub const RANK_DEFAULT_REASON: &str = "Top rated band in this genre";

struct Scored<'a> {
    band: &'a Band,
    score: u32,
}

fn score_candidates<'a>(
    candidates: &'a [Band],
    weights: &PreferenceWeights,
    exclude: &HashSet<String>,
) -> Vec<Scored<'a>> {
    let mut scored: Vec<Scored<'a>> = candidates
        .iter()
        .filter(|band| !exclude.contains(&band.id))
        .map(|band| Scored {
            band,
            score: score_band(band, weights),
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

pub fn suggest_confidence(score: u32, tier: Tier) -> f64 {
    let base = (SUGGEST_BASE + f64::from(score) * SUGGEST_STEP).min(SUGGEST_CAP);
    (base + tier.bonus()).min(SUGGEST_CAP)
}

pub fn rank_confidence(score: u32, tier: Tier) -> f64 {
    let base = (RANK_BASE + f64::from(score) * RANK_STEP).min(RANK_CAP);
    (base + tier.bonus()).min(RANK_CAP)
}

/// Top `count` candidates by score
pub fn suggest(
    candidates: &[Band],
    weights: &PreferenceWeights,
    exclude: &HashSet<String>,
    count: usize,
) -> Vec<Recommendation> {
    score_candidates(candidates, weights, exclude)
        .into_iter()
        .take(count)
        .map(|s| Recommendation {
            band: s.band.clone(),
            reason: if s.score > 0 {
                SUGGEST_MATCH_REASON
            } else {
                SUGGEST_DEFAULT_REASON
            }
            .to_string(),
            confidence: suggest_confidence(s.score, s.band.tier),
        })
        .collect()
}

/// Tier-diversified list of at most `max_count` recommendations.
///
/// Output order: the best well-known bands (up to two), the best popular
/// bands (up to three), then the highest-scoring remaining bands of any tier.
pub fn rank(
    candidates: &[Band],
    weights: &PreferenceWeights,
    exclude: &HashSet<String>,
    max_count: usize,
) -> Vec<Recommendation> {
    let scored = score_candidates(candidates, weights, exclude);

    let forced_well_known = scored
        .iter()
        .filter(|s| s.band.tier == Tier::WellKnown)
        .take(FORCED_WELL_KNOWN);
    let forced_popular = scored
        .iter()
        .filter(|s| s.band.tier == Tier::Popular)
        .take(FORCED_POPULAR);

    let mut picked: Vec<&Scored<'_>> = forced_well_known.chain(forced_popular).collect();
    let mut chosen: HashSet<&str> = picked.iter().map(|s| s.band.id.as_str()).collect();

    for candidate in &scored {
        if picked.len() >= max_count {
            break;
        }
        if chosen.insert(candidate.band.id.as_str()) {
            picked.push(candidate);
        }
    }
    picked.truncate(max_count);

    picked
        .into_iter()
        .map(|s| Recommendation {
            band: s.band.clone(),
            reason: if s.score > 0 {
                RANK_MATCH_REASON
            } else {
                RANK_DEFAULT_REASON
            }
            .to_string(),
            confidence: rank_confidence(s.score, s.band.tier),
        })
        .collect()
}
