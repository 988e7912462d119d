//! # MTR Common Library
//!
//! Shared code for the metal taste recommender services including:
//! - Band, session and comparison records
//! - Catalog and session store traits with SQLite and in-memory backends
//! - TOML configuration loading and root folder resolution
//! - Database initialization

pub mod config;
pub mod db;
pub mod error;
pub mod store;
pub mod time;

pub use db::models::{
    Band, Comparison, PairKey, PhasePolicy, PreferenceWeights, Recommendation, Session, Skip,
    SkipPolicy, Tier,
};
pub use error::{Error, Result};
pub use store::{CatalogStore, MemoryCatalogStore, MemorySessionStore, SessionStore};
