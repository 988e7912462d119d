//! Explorer configuration resolved from the TOML `[explorer]` table

use mtr_common::config::ExplorerSettings;
use mtr_common::{Error, Result, SkipPolicy};
use tracing::warn;

use crate::engine::pair_selector::{phases_for, PairSelector, TierPhase};
use crate::engine::picks::DEFAULT_PICKS_LIMIT;

#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    pub max_recommendations: usize,
    pub default_suggestions: usize,
    pub retry_budget: usize,
    pub phases: Vec<TierPhase>,
    pub skip_policy: SkipPolicy,
    pub min_bands_per_genre: u64,
    pub genres: Vec<String>,
    pub rng_seed: Option<u64>,
    pub picks_limit: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        let settings = ExplorerSettings::default();
        Self {
            max_recommendations: settings.max_recommendations,
            default_suggestions: settings.default_suggestions,
            retry_budget: settings.retry_budget,
            phases: phases_for(settings.phase_policy),
            skip_policy: settings.skip_policy,
            min_bands_per_genre: settings.min_bands_per_genre,
            genres: settings.genres,
            rng_seed: settings.rng_seed,
            picks_limit: DEFAULT_PICKS_LIMIT,
        }
    }
}

impl ExplorerConfig {
    /// Validate settings and resolve the phase list.
    ///
    /// An explicit `pair_phases` list replaces `phase_policy`.
    pub fn from_settings(settings: &ExplorerSettings) -> Result<Self> {
        let phases = match &settings.pair_phases {
            Some(labels) => {
                let phases = labels
                    .iter()
                    .map(|label| {
                        label
                            .parse::<TierPhase>()
                            .map_err(|e| Error::Config(format!("explorer.pair_phases: {}", e)))
                    })
                    .collect::<Result<Vec<_>>>()?;
                if phases.is_empty() {
                    return Err(Error::Config(
                        "explorer.pair_phases must list at least one phase".to_string(),
                    ));
                }
                phases
            }
            None => phases_for(settings.phase_policy),
        };

        if settings.retry_budget == 0 {
            warn!("explorer.retry_budget is 0; every pair request will report exhaustion");
        }
        if settings.genres.is_empty() {
            warn!("explorer.genres is empty; no genres will be offered");
        }

        Ok(Self {
            max_recommendations: settings.max_recommendations,
            default_suggestions: settings.default_suggestions,
            retry_budget: settings.retry_budget,
            phases,
            skip_policy: settings.skip_policy,
            min_bands_per_genre: settings.min_bands_per_genre,
            genres: settings.genres.clone(),
            rng_seed: settings.rng_seed,
            picks_limit: DEFAULT_PICKS_LIMIT,
        })
    }

    pub fn pair_selector(&self) -> PairSelector {
        PairSelector::new(self.phases.clone(), self.retry_budget)
    }
}
