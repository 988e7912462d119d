//! Database models
//!
//! Closed set of records shared by the stores, the exploration engine and
//! the HTTP layer. Wire field names are camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// Coarse popularity bucket of a band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    WellKnown,
    Popular,
    #[default]
    Niche,
}

impl Tier {
    /// Parse a stored tier label. Unknown labels fall back to `Niche`.
    pub fn parse_lenient(label: &str) -> Tier {
        match label.trim().to_ascii_lowercase().as_str() {
            "well-known" | "well_known" | "wellknown" => Tier::WellKnown,
            "popular" => Tier::Popular,
            _ => Tier::Niche,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::WellKnown => "well-known",
            Tier::Popular => "popular",
            Tier::Niche => "niche",
        }
    }

    /// Confidence bonus granted to recommendations of this tier
    pub fn bonus(&self) -> f64 {
        match self {
            Tier::WellKnown => 0.05,
            Tier::Popular => 0.02,
            Tier::Niche => 0.0,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Tier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label.map(|l| Tier::parse_lenient(&l)).unwrap_or_default())
    }
}

/// A band record as read from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Band {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Ordered genre tags, never empty for stored bands
    #[serde(rename = "genre")]
    pub genres: Vec<String>,
    #[serde(default)]
    pub era: String,
    #[serde(default)]
    pub albums: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_notes: Option<String>,
    #[serde(default)]
    pub tier: Tier,
}

impl Band {
    /// Minimal band with empty metadata
    pub fn new(id: impl Into<String>, name: impl Into<String>, genres: &[&str], tier: Tier) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            era: String::new(),
            albums: Vec::new(),
            description: String::new(),
            style_notes: None,
            tier,
        }
    }

    /// Case-insensitive genre tag membership
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g.eq_ignore_ascii_case(genre))
    }
}

/// Unordered pair of two band identifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(String, String);

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            PairKey(a.to_string(), b.to_string())
        } else {
            PairKey(b.to_string(), a.to_string())
        }
    }
}

/// A recorded preference between two bands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub band_id_1: String,
    pub band_id_2: String,
    pub selected_band_id: String,
    pub timestamp: DateTime<Utc>,
}

impl Comparison {
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(&self.band_id_1, &self.band_id_2)
    }
}

/// A pair the user declined to judge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skip {
    pub band_id_1: String,
    pub band_id_2: String,
    pub timestamp: DateTime<Utc>,
}

impl Skip {
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(&self.band_id_1, &self.band_id_2)
    }
}

/// Whether a skipped pair may be offered again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipPolicy {
    /// Skipped pairs join the repeat-avoidance set
    #[default]
    Retire,
    /// Skipped pairs stay eligible for re-presentation
    Eligible,
}

/// Which tier phases the pair selector walks through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhasePolicy {
    /// well-known and popular bands only; niche bands are never paired
    Core,
    /// all six tier combinations
    #[default]
    Extended,
}

/// Accumulated genre weights of a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceWeights(BTreeMap<String, u32>);

impl PreferenceWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight of a genre, 0 when absent
    pub fn get(&self, genre: &str) -> u32 {
        self.0.get(genre).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, genre: &str) {
        let weight = self.0.entry(genre.to_string()).or_insert(0);
        *weight = weight.saturating_add(1);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(g, w)| (g.as_str(), *w))
    }
}

impl<const N: usize> From<[(&str, u32); N]> for PreferenceWeights {
    fn from(entries: [(&str, u32); N]) -> Self {
        Self(entries.iter().map(|(g, w)| (g.to_string(), *w)).collect())
    }
}

/// One user's genre exploration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub genre: String,
    #[serde(rename = "comparisonHistory")]
    pub comparisons: Vec<Comparison>,
    #[serde(default, rename = "skipHistory")]
    pub skips: Vec<Skip>,
    pub preference_weights: PreferenceWeights,
    #[serde(default)]
    pub seen_bands: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(genre: impl Into<String>) -> Self {
        let now = crate::time::now();
        Self {
            id: crate::time::new_session_id(),
            genre: genre.into(),
            comparisons: Vec::new(),
            skips: Vec::new(),
            preference_weights: PreferenceWeights::new(),
            seen_bands: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Pairs that must not be offered again
    pub fn compared_pairs(&self, skip_policy: SkipPolicy) -> HashSet<PairKey> {
        let mut pairs: HashSet<PairKey> = self.comparisons.iter().map(Comparison::pair_key).collect();
        if skip_policy == SkipPolicy::Retire {
            pairs.extend(self.skips.iter().map(Skip::pair_key));
        }
        pairs
    }

    /// Bands that took part in a recorded comparison
    pub fn compared_band_ids(&self) -> HashSet<String> {
        self.comparisons
            .iter()
            .flat_map(|c| [c.band_id_1.clone(), c.band_id_2.clone()])
            .collect()
    }

    pub fn has_comparison(&self, key: &PairKey) -> bool {
        self.comparisons.iter().any(|c| &c.pair_key() == key)
    }

    pub fn mark_seen(&mut self, band_id: &str) {
        self.seen_bands.insert(band_id.to_string());
    }

    pub fn touch(&mut self) {
        self.updated_at = crate::time::now();
    }
}

/// A suggested band with its reason and confidence in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub band: Band,
    pub reason: String,
    pub confidence: f64,
}
