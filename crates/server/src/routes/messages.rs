use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::errors::ApiError;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    pub user1: Option<String>,
    pub user2: Option<String>,
}

#[utoipa::path(get, path = "/api/messages", tag = "messages", responses((status = 200, description = "Conversation"), (status = 400, description = "Bad Request")))]
pub async fn get_messages(
    State(state): State<AppState>,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (user1, user2) = match (query.user1, query.user2) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(ApiError::bad_request("Missing user1 or user2 parameters")),
    };
    let messages = state.messages.conversation(&user1, &user2).await;
    Ok(Json(serde_json::json!({"messages": messages})))
}

#[derive(Debug, Deserialize)]
pub struct SendInput {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub message: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[utoipa::path(post, path = "/api/messages", tag = "messages", request_body = crate::openapi::SendMessageRequest, responses((status = 200, description = "Sent"), (status = 400, description = "Bad Request")))]
pub async fn send_message(
    State(state): State<AppState>,
    Json(input): Json<SendInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (sender, recipient, message) = match (input.sender, input.recipient, input.message) {
        (Some(s), Some(r), Some(m)) => (s, r, m),
        _ => return Err(ApiError::bad_request("Missing required fields")),
    };
    let stored = state
        .messages
        .append(&sender, &recipient, &message, input.timestamp)
        .await?;
    Ok(Json(serde_json::json!({"success": true, "message": stored})))
}
