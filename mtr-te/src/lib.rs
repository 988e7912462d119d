//! mtr-te library - Taste Explorer module
//!
//! Pairwise band comparisons within a genre, genre preference weights
//! learned from the choices, and tier-diversified recommendations.

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;

use engine::TasteExplorer;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub explorer: Arc<TasteExplorer>,
}

impl AppState {
    pub fn new(explorer: Arc<TasteExplorer>) -> Self {
        Self { explorer }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::genre_routes())
        .merge(api::explore_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
