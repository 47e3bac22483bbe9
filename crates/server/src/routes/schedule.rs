use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::errors::ApiError;
use crate::routes::AppState;

#[utoipa::path(get, path = "/api/schedule", tag = "schedule", responses((status = 200, description = "The 24-slot board")))]
pub async fn get_schedule(State(state): State<AppState>) -> Json<serde_json::Value> {
    let board = state.schedule.board().await;
    Json(serde_json::json!({"slots": board}))
}

/// What the stream is playing in the current UTC hour.
#[utoipa::path(get, path = "/api/schedule/now", tag = "schedule", responses((status = 200, description = "The current show, or null")))]
pub async fn now_playing(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({"show": state.schedule.on_air().await}))
}

#[derive(Debug, Deserialize)]
pub struct ClaimInput {
    pub email: Option<String>,
    pub title: Option<String>,
    pub slot: Option<usize>,
}

#[utoipa::path(post, path = "/api/schedule/claim", tag = "schedule", request_body = crate::openapi::ClaimRequest, responses((status = 200, description = "Claimed"), (status = 400, description = "Bad Request"), (status = 404, description = "Unknown user"), (status = 409, description = "Conflict")))]
pub async fn claim(
    State(state): State<AppState>,
    Json(input): Json<ClaimInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (email, title) = match (input.email, input.title) {
        (Some(e), Some(t)) => (e, t),
        _ => return Err(ApiError::bad_request("Missing email or title")),
    };
    if !state.profiles.exists(&email).await {
        return Err(ApiError::from(service::errors::ServiceError::not_found("user")));
    }
    let (slot, show) = state.schedule.claim(&email, &title, input.slot).await?;
    Ok(Json(serde_json::json!({"success": true, "slot": slot, "show": show})))
}

#[derive(Debug, Deserialize)]
pub struct SwapInput {
    pub email: Option<String>,
    pub from: Option<usize>,
    pub to: Option<usize>,
}

#[utoipa::path(post, path = "/api/schedule/swap", tag = "schedule", request_body = crate::openapi::SwapRequest, responses((status = 200, description = "Swapped"), (status = 400, description = "Bad Request"), (status = 403, description = "Not the host"), (status = 404, description = "Empty slot")))]
pub async fn swap(
    State(state): State<AppState>,
    Json(input): Json<SwapInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (email, from, to) = match (input.email, input.from, input.to) {
        (Some(e), Some(f), Some(t)) => (e, f, t),
        _ => return Err(ApiError::bad_request("Missing email, from or to")),
    };
    state.schedule.swap(&email, from, to).await?;
    Ok(Json(serde_json::json!({"success": true})))
}

#[derive(Debug, Deserialize)]
pub struct ReleaseInput {
    pub email: Option<String>,
}

#[utoipa::path(delete, path = "/api/schedule/{slot}", tag = "schedule", responses((status = 200, description = "Released"), (status = 400, description = "Bad Request"), (status = 403, description = "Not the host"), (status = 404, description = "Empty slot")))]
pub async fn release(
    State(state): State<AppState>,
    Path(slot): Path<usize>,
    Json(input): Json<ReleaseInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let email = input.email.ok_or_else(|| ApiError::bad_request("Missing email"))?;
    state.schedule.release(&email, slot).await?;
    Ok(Json(serde_json::json!({"success": true})))
}
