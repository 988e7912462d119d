//! Pair selection with a tier-priority cascade
//!
//! Phases are tried in order; each phase draws random pairs from its tier
//! pools until it finds one not yet compared or its retry budget runs out.
//! The first successful phase wins. Early comparisons therefore favour
//! well-known bands and niche bands only appear once those pairings run dry.

use mtr_common::{Band, PairKey, PhasePolicy, Tier};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::{ExploreError, ExploreResult};

/// Random draws per phase before moving to the next one
pub const DEFAULT_RETRY_BUDGET: usize = 100;

/// One step of the cascade: draw one band from each tier pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TierPhase {
    pub first: Tier,
    pub second: Tier,
}

impl TierPhase {
    pub const fn new(first: Tier, second: Tier) -> Self {
        Self { first, second }
    }

    pub fn is_mixed(&self) -> bool {
        self.first != self.second
    }
}

/// Phases 1-3: niche bands are never compared
pub const CORE_PHASES: [TierPhase; 3] = [
    TierPhase::new(Tier::WellKnown, Tier::WellKnown),
    TierPhase::new(Tier::WellKnown, Tier::Popular),
    TierPhase::new(Tier::Popular, Tier::Popular),
];

/// Phases 1-6
pub const EXTENDED_PHASES: [TierPhase; 6] = [
    TierPhase::new(Tier::WellKnown, Tier::WellKnown),
    TierPhase::new(Tier::WellKnown, Tier::Popular),
    TierPhase::new(Tier::Popular, Tier::Popular),
    TierPhase::new(Tier::WellKnown, Tier::Niche),
    TierPhase::new(Tier::Popular, Tier::Niche),
    TierPhase::new(Tier::Niche, Tier::Niche),
];

pub fn phases_for(policy: PhasePolicy) -> Vec<TierPhase> {
    match policy {
        PhasePolicy::Core => CORE_PHASES.to_vec(),
        PhasePolicy::Extended => EXTENDED_PHASES.to_vec(),
    }
}

fn parse_tier_label(label: &str) -> Result<Tier, String> {
    match label.trim().to_ascii_lowercase().as_str() {
        "well-known" => Ok(Tier::WellKnown),
        "popular" => Ok(Tier::Popular),
        "niche" => Ok(Tier::Niche),
        other => Err(format!("unknown tier '{}'", other)),
    }
}

impl FromStr for TierPhase {
    type Err = String;

    /// Parses `"well-known/popular"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (first, second) = s
            .split_once('/')
            .ok_or_else(|| format!("phase '{}' must look like 'tier/tier'", s))?;
        Ok(TierPhase::new(parse_tier_label(first)?, parse_tier_label(second)?))
    }
}

impl fmt::Display for TierPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.first, self.second)
    }
}

/// Two distinct bands offered for comparison
#[derive(Debug, Clone, PartialEq)]
pub struct BandPair {
    pub band1: Band,
    pub band2: Band,
}

impl BandPair {
    pub fn key(&self) -> PairKey {
        PairKey::new(&self.band1.id, &self.band2.id)
    }
}

/// Result of a selection that had enough bands to work with
#[derive(Debug, Clone, PartialEq)]
pub enum PairOutcome {
    Pair(BandPair),
    /// Every phase spent its budget without finding an unused pair
    Exhausted,
}

struct TierPools<'a> {
    well_known: Vec<&'a Band>,
    popular: Vec<&'a Band>,
    niche: Vec<&'a Band>,
}

impl<'a> TierPools<'a> {
    fn partition(bands: &'a [Band]) -> Self {
        let mut pools = TierPools {
            well_known: Vec::new(),
            popular: Vec::new(),
            niche: Vec::new(),
        };
        for band in bands {
            match band.tier {
                Tier::WellKnown => pools.well_known.push(band),
                Tier::Popular => pools.popular.push(band),
                Tier::Niche => pools.niche.push(band),
            }
        }
        pools
    }

    fn get(&self, tier: Tier) -> &[&'a Band] {
        match tier {
            Tier::WellKnown => &self.well_known,
            Tier::Popular => &self.popular,
            Tier::Niche => &self.niche,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PairSelector {
    phases: Vec<TierPhase>,
    retry_budget: usize,
}

impl Default for PairSelector {
    fn default() -> Self {
        Self::with_policy(PhasePolicy::default())
    }
}

impl PairSelector {
    pub fn new(phases: Vec<TierPhase>, retry_budget: usize) -> Self {
        Self {
            phases,
            retry_budget,
        }
    }

    pub fn with_policy(policy: PhasePolicy) -> Self {
        Self::new(phases_for(policy), DEFAULT_RETRY_BUDGET)
    }

    pub fn phases(&self) -> &[TierPhase] {
        &self.phases
    }

    pub fn retry_budget(&self) -> usize {
        self.retry_budget
    }

    /// Choose the next pair among `bands` avoiding every pair in `compared`.
    ///
    /// Fewer than two bands is `InsufficientCandidates`; having bands but no
    /// reachable unused pair is `Ok(PairOutcome::Exhausted)`.
    pub fn select<R: Rng + ?Sized>(
        &self,
        genre: &str,
        bands: &[Band],
        compared: &HashSet<PairKey>,
        rng: &mut R,
    ) -> ExploreResult<PairOutcome> {
        if bands.len() < 2 {
            return Err(ExploreError::InsufficientCandidates {
                genre: genre.to_string(),
                available: bands.len(),
            });
        }

        let pools = TierPools::partition(bands);

        for (index, phase) in self.phases.iter().enumerate() {
            if let Some(pair) = self.try_phase(*phase, &pools, compared, rng) {
                debug!(
                    "Phase {} ({}) picked {} vs {} for genre {}",
                    index + 1,
                    phase,
                    pair.band1.id,
                    pair.band2.id,
                    genre
                );
                return Ok(PairOutcome::Pair(pair));
            }
        }

        debug!(
            "All {} phases exhausted for genre {} ({} bands, {} pairs used)",
            self.phases.len(),
            genre,
            bands.len(),
            compared.len()
        );
        Ok(PairOutcome::Exhausted)
    }

    fn try_phase<R: Rng + ?Sized>(
        &self,
        phase: TierPhase,
        pools: &TierPools<'_>,
        compared: &HashSet<PairKey>,
        rng: &mut R,
    ) -> Option<BandPair> {
        if phase.is_mixed() {
            let left = pools.get(phase.first);
            let right = pools.get(phase.second);
            if left.is_empty() || right.is_empty() {
                return None;
            }
            for _ in 0..self.retry_budget {
                let (Some(a), Some(b)) = (left.choose(rng), right.choose(rng)) else {
                    return None;
                };
                if let Some(pair) = accept(a, b, compared) {
                    return Some(pair);
                }
            }
        } else {
            let mut pool: Vec<&Band> = pools.get(phase.first).to_vec();
            if pool.len() < 2 {
                return None;
            }
            for _ in 0..self.retry_budget {
                let (drawn, _) = pool.partial_shuffle(rng, 2);
                if let Some(pair) = accept(drawn[0], drawn[1], compared) {
                    return Some(pair);
                }
            }
        }
        None
    }
}

fn accept(a: &Band, b: &Band, compared: &HashSet<PairKey>) -> Option<BandPair> {
    if a.id == b.id || compared.contains(&PairKey::new(&a.id, &b.id)) {
        return None;
    }
    Some(BandPair {
        band1: a.clone(),
        band2: b.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn band(id: &str, tier: Tier) -> Band {
        Band::new(id, id.to_uppercase(), &["thrash"], tier)
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn unwrap_pair(outcome: PairOutcome) -> BandPair {
        match outcome {
            PairOutcome::Pair(pair) => pair,
            PairOutcome::Exhausted => panic!("expected a pair"),
        }
    }

    #[test]
    fn test_fewer_than_two_bands_is_insufficient() {
        let selector = PairSelector::default();
        let none: Vec<Band> = Vec::new();
        let one = vec![band("a", Tier::WellKnown)];

        for bands in [none, one] {
            let result = selector.select("thrash", &bands, &HashSet::new(), &mut rng());
            assert!(matches!(
                result,
                Err(ExploreError::InsufficientCandidates { available, .. }) if available == bands.len()
            ));
        }
    }

    #[test]
    fn test_well_known_pair_comes_first() {
        let selector = PairSelector::default();
        let bands = vec![
            band("n1", Tier::Niche),
            band("w1", Tier::WellKnown),
            band("p1", Tier::Popular),
            band("w2", Tier::WellKnown),
            band("p2", Tier::Popular),
            band("w3", Tier::WellKnown),
        ];

        let mut rng = rng();
        for _ in 0..20 {
            let pair = unwrap_pair(selector.select("thrash", &bands, &HashSet::new(), &mut rng).unwrap());
            assert_eq!(pair.band1.tier, Tier::WellKnown);
            assert_eq!(pair.band2.tier, Tier::WellKnown);
            assert_ne!(pair.band1.id, pair.band2.id);
        }
    }

    #[test]
    fn test_falls_through_to_mixed_then_popular() {
        let selector = PairSelector::default();
        let bands = vec![
            band("w1", Tier::WellKnown),
            band("p1", Tier::Popular),
            band("p2", Tier::Popular),
        ];

        // One well-known band: phase 1 cannot run, phase 2 pairs it with a popular band
        let mut compared = HashSet::new();
        let first = unwrap_pair(selector.select("thrash", &bands, &compared, &mut rng()).unwrap());
        assert_eq!(first.band1.tier, Tier::WellKnown);
        assert_eq!(first.band2.tier, Tier::Popular);

        compared.insert(PairKey::new("w1", "p1"));
        compared.insert(PairKey::new("w1", "p2"));
        let third = unwrap_pair(selector.select("thrash", &bands, &compared, &mut rng()).unwrap());
        assert_eq!(third.key(), PairKey::new("p1", "p2"));
    }

    #[test]
    fn test_core_policy_never_pairs_niche_bands() {
        let selector = PairSelector::with_policy(PhasePolicy::Core);
        let bands = vec![band("n1", Tier::Niche), band("n2", Tier::Niche), band("n3", Tier::Niche)];

        let outcome = selector.select("doom", &bands, &HashSet::new(), &mut rng()).unwrap();
        assert_eq!(outcome, PairOutcome::Exhausted);

        let extended = PairSelector::with_policy(PhasePolicy::Extended);
        let pair = unwrap_pair(extended.select("doom", &bands, &HashSet::new(), &mut rng()).unwrap());
        assert_eq!(pair.band1.tier, Tier::Niche);
    }

    #[test]
    fn test_extended_policy_pairs_well_known_with_niche() {
        let selector = PairSelector::with_policy(PhasePolicy::Extended);
        let bands = vec![band("w1", Tier::WellKnown), band("n1", Tier::Niche)];

        let pair = unwrap_pair(selector.select("folk", &bands, &HashSet::new(), &mut rng()).unwrap());
        assert_eq!(pair.key(), PairKey::new("w1", "n1"));
        assert_eq!(pair.band1.id, "w1");
    }

    #[test]
    fn test_all_pairs_used_is_exhausted() {
        let selector = PairSelector::default();
        let bands = vec![band("a", Tier::WellKnown), band("b", Tier::WellKnown), band("c", Tier::Popular)];
        let compared: HashSet<PairKey> = [
            PairKey::new("a", "b"),
            PairKey::new("b", "c"),
            PairKey::new("c", "a"),
        ]
        .into_iter()
        .collect();

        let outcome = selector.select("thrash", &bands, &compared, &mut rng()).unwrap();
        assert_eq!(outcome, PairOutcome::Exhausted);
    }

    #[test]
    fn test_zero_retry_budget_exhausts_every_phase() {
        let selector = PairSelector::new(EXTENDED_PHASES.to_vec(), 0);
        let bands = vec![band("a", Tier::WellKnown), band("b", Tier::WellKnown)];

        let outcome = selector.select("thrash", &bands, &HashSet::new(), &mut rng()).unwrap();
        assert_eq!(outcome, PairOutcome::Exhausted);
    }

    #[test]
    fn test_duplicate_ids_never_form_a_pair() {
        let selector = PairSelector::default();
        let bands = vec![band("a", Tier::WellKnown), band("a", Tier::WellKnown)];

        let outcome = selector.select("thrash", &bands, &HashSet::new(), &mut rng()).unwrap();
        assert_eq!(outcome, PairOutcome::Exhausted);
    }

    #[test]
    fn test_three_bands_yield_three_distinct_pairs() {
        let selector = PairSelector::default();
        let bands = vec![band("a", Tier::WellKnown), band("b", Tier::WellKnown), band("c", Tier::WellKnown)];
        let mut compared = HashSet::new();
        let mut rng = rng();

        for _ in 0..3 {
            let pair = unwrap_pair(selector.select("thrash", &bands, &compared, &mut rng).unwrap());
            assert!(compared.insert(pair.key()), "pair repeated: {:?}", pair.key());
        }
        assert_eq!(compared.len(), 3);
        assert_eq!(
            selector.select("thrash", &bands, &compared, &mut rng).unwrap(),
            PairOutcome::Exhausted
        );
    }

    #[test]
    fn test_phase_parsing() {
        let phase: TierPhase = "well-known/popular".parse().unwrap();
        assert_eq!(phase, TierPhase::new(Tier::WellKnown, Tier::Popular));
        assert_eq!(phase.to_string(), "well-known/popular");
        assert!(phase.is_mixed());

        assert!("niche".parse::<TierPhase>().is_err());
        assert!("niche/legendary".parse::<TierPhase>().is_err());
    }
}
