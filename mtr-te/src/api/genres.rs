//! Genre listing and catalog picks

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use mtr_common::Band;
use serde::{Deserialize, Serialize};

use crate::catalog::GenreInfo;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct GenresResponse {
    pub genres: Vec<GenreInfo>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub genre: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub genre: String,
    pub recommendations: Vec<Band>,
}

/// GET /api/genres
///
/// Genres with at least the configured minimum of bands.
pub async fn list_genres(State(state): State<AppState>) -> ApiResult<Json<GenresResponse>> {
    let genres = state.explorer.genres().await?;
    Ok(Json(GenresResponse { genres }))
}

/// POST /api/recommendations/generate
pub async fn generate_picks(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    let genre = request
        .genre
        .filter(|g| !g.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("genre is required".to_string()))?;

    let recommendations = state.explorer.catalog_picks(&genre).await?;
    Ok(Json(GenerateResponse {
        genre,
        recommendations,
    }))
}

pub fn genre_routes() -> Router<AppState> {
    Router::new()
        .route("/api/genres", get(list_genres))
        .route("/api/recommendations/generate", post(generate_picks))
}
