use axum::{
    extract::{Path, State},
    Json,
};
use models::trade::{Trade, TradeStatus};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct TradeInput {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<f64>,
    pub note: Option<String>,
}

#[utoipa::path(post, path = "/api/trade", tag = "trades", request_body = crate::openapi::TradeRequest, responses((status = 200, description = "Proposed"), (status = 400, description = "Bad Request"), (status = 404, description = "Unknown party")))]
pub async fn create_trade(
    State(state): State<AppState>,
    Json(input): Json<TradeInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (sender, recipient, amount) = match (input.sender, input.recipient, input.amount) {
        (Some(s), Some(r), Some(a)) => (s, r, a),
        _ => return Err(ApiError::bad_request("Missing or invalid trade details")),
    };
    let trade = state
        .trades
        .propose(
            &state.profiles,
            &sender,
            &recipient,
            amount,
            input.note.as_deref().unwrap_or(""),
        )
        .await?;
    Ok(Json(serde_json::json!({"success": true, "trade": trade})))
}

#[utoipa::path(get, path = "/api/trades", tag = "trades", responses((status = 200, description = "Pending trades")))]
pub async fn list_pending(State(state): State<AppState>) -> Json<Vec<Trade>> {
    Json(state.trades.pending())
}

#[utoipa::path(get, path = "/api/trades/{email}", tag = "trades", responses((status = 200, description = "Trades involving the user, newest first")))]
pub async fn trades_for_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Json<Vec<Trade>> {
    Json(state.trades.for_user(&email))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeDecisionInput {
    pub trade_id: Option<String>,
    pub status: Option<String>,
    pub user_email: Option<String>,
}

#[utoipa::path(post, path = "/api/trade/update", tag = "trades", request_body = crate::openapi::TradeDecisionRequest, responses((status = 200, description = "Settled"), (status = 400, description = "Bad Request"), (status = 403, description = "Not the recipient"), (status = 404, description = "Unknown trade")))]
pub async fn update_trade(
    State(state): State<AppState>,
    Json(input): Json<TradeDecisionInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let status = match input.status.as_deref() {
        Some("accepted") => TradeStatus::Accepted,
        Some("rejected") => TradeStatus::Rejected,
        _ => return Err(ApiError::bad_request("Invalid status")),
    };
    let (trade_id, user_email) = match (input.trade_id, input.user_email) {
        (Some(t), Some(u)) => (t, u),
        _ => return Err(ApiError::bad_request("Missing tradeId or userEmail")),
    };
    // An unparseable id can't match any trade.
    let trade_id = Uuid::parse_str(&trade_id)
        .map_err(|_| ApiError::from(service::errors::ServiceError::not_found("trade")))?;

    let trade = state
        .trades
        .resolve(&state.profiles, trade_id, status, &user_email)
        .await?;
    Ok(Json(serde_json::json!({"success": true, "trade": trade})))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelInput {
    pub user_email: Option<String>,
}

#[utoipa::path(delete, path = "/api/trade/{trade_id}", tag = "trades", responses((status = 200, description = "Cancelled"), (status = 400, description = "Already processed"), (status = 403, description = "Not the sender"), (status = 404, description = "Unknown trade")))]
pub async fn cancel_trade(
    State(state): State<AppState>,
    Path(trade_id): Path<Uuid>,
    Json(input): Json<CancelInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_email = input
        .user_email
        .ok_or_else(|| ApiError::bad_request("Missing userEmail"))?;
    state.trades.cancel(&state.profiles, trade_id, &user_email).await?;
    Ok(Json(serde_json::json!({"success": true, "message": "Trade cancelled"})))
}
