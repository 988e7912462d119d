//! Comparison and recommendation engine
//!
//! - [`pair_selector`]: which two bands to show next
//! - [`preference`]: session weights from recorded choices
//! - [`ranker`]: suggestions and tier-diversified recommendations
//! - [`picks`]: session-independent top list for a genre
//! - [`service`]: session-scoped operations over the stores

pub mod pair_selector;
pub mod picks;
pub mod preference;
pub mod ranker;
pub mod service;

pub use pair_selector::{BandPair, PairOutcome, PairSelector, TierPhase};
pub use service::{SessionSummary, TasteExplorer};

use thiserror::Error;

/// Errors surfaced by the exploration engine
#[derive(Debug, Error)]
pub enum ExploreError {
    /// No state for the session id; not retried
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Fewer than two bands even after populating the genre
    #[error("Not enough bands for genre '{genre}': {available} available, 2 required")]
    InsufficientCandidates { genre: String, available: usize },

    /// Rejected before any state was mutated
    #[error("Invalid comparison: {0}")]
    InvalidComparison(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Catalog or session store failure, propagated unmodified
    #[error(transparent)]
    Store(#[from] mtr_common::Error),
}

pub type ExploreResult<T> = Result<T, ExploreError>;
