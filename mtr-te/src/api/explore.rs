//! Session endpoints: start, compare, skip, suggest, recommend

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use mtr_common::{Band, Recommendation};
use serde::{Deserialize, Serialize};

use crate::engine::{PairOutcome, SessionSummary};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub genre: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionResponse {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub session_id: Option<String>,
    /// Only read by the suggestions endpoint
    pub count: Option<usize>,
}

/// Either a pair to judge or the end-of-session marker
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ComparisonResponse {
    Pair { band1: Band, band2: Band },
    Done { done: bool },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceRequest {
    pub session_id: Option<String>,
    pub band_id_1: Option<String>,
    pub band_id_2: Option<String>,
    pub selected_band_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipRequest {
    pub session_id: Option<String>,
    pub band_id_1: Option<String>,
    pub band_id_2: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Recommendation>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
}

fn required(value: Option<String>, field: &str) -> ApiResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{} is required", field)))
}

/// POST /api/session
pub async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<StartSessionRequest>,
) -> ApiResult<Json<StartSessionResponse>> {
    let genre = required(request.genre, "genre")?;
    let session = state.explorer.start_session(&genre).await?;
    Ok(Json(StartSessionResponse {
        session_id: session.id,
    }))
}

/// GET /api/comparison?sessionId=
pub async fn next_comparison(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> ApiResult<Json<ComparisonResponse>> {
    let session_id = required(query.session_id, "sessionId")?;
    let response = match state.explorer.next_pair(&session_id).await? {
        PairOutcome::Pair(pair) => ComparisonResponse::Pair {
            band1: pair.band1,
            band2: pair.band2,
        },
        PairOutcome::Exhausted => ComparisonResponse::Done { done: true },
    };
    Ok(Json(response))
}

/// POST /api/preference
pub async fn record_preference(
    State(state): State<AppState>,
    Json(request): Json<PreferenceRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let session_id = required(request.session_id, "sessionId")?;
    let band_id_1 = required(request.band_id_1, "bandId1")?;
    let band_id_2 = required(request.band_id_2, "bandId2")?;
    let selected = required(request.selected_band_id, "selectedBandId")?;

    state
        .explorer
        .record_preference(&session_id, &band_id_1, &band_id_2, &selected)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/skip
pub async fn record_skip(
    State(state): State<AppState>,
    Json(request): Json<SkipRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let session_id = required(request.session_id, "sessionId")?;
    let band_id_1 = required(request.band_id_1, "bandId1")?;
    let band_id_2 = required(request.band_id_2, "bandId2")?;

    state
        .explorer
        .record_skip(&session_id, &band_id_1, &band_id_2)
        .await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// GET /api/suggestions?sessionId=&count=
pub async fn suggestions(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> ApiResult<Json<SuggestionsResponse>> {
    let session_id = required(query.session_id, "sessionId")?;
    let count = query
        .count
        .unwrap_or(state.explorer.config().default_suggestions);
    let suggestions = state.explorer.suggestions(&session_id, count).await?;
    Ok(Json(SuggestionsResponse { suggestions }))
}

/// GET /api/recommendations?sessionId=
pub async fn recommendations(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> ApiResult<Json<RecommendationsResponse>> {
    let session_id = required(query.session_id, "sessionId")?;
    let recommendations = state.explorer.recommendations(&session_id).await?;
    Ok(Json(RecommendationsResponse { recommendations }))
}

/// GET /api/session/:id
pub async fn session_summary(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SessionSummary>> {
    Ok(Json(state.explorer.session_summary(&session_id).await?))
}

pub fn explore_routes() -> Router<AppState> {
    Router::new()
        .route("/api/session", post(start_session))
        .route("/api/session/:id", get(session_summary))
        .route("/api/comparison", get(next_comparison))
        .route("/api/preference", post(record_preference))
        .route("/api/skip", post(record_skip))
        .route("/api/suggestions", get(suggestions))
        .route("/api/recommendations", get(recommendations))
}
