use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::errors::ApiError;
use crate::routes::AppState;
use crate::ws::{FeedEvent, FeedFrame};

#[utoipa::path(get, path = "/api/news", tag = "news", responses((status = 200, description = "The feed")))]
pub async fn get_news(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({"stories": state.news.list().await}))
}

#[derive(Debug, Deserialize)]
pub struct PublishInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[utoipa::path(post, path = "/api/news", tag = "news", request_body = crate::openapi::PublishRequest, responses((status = 200, description = "Published"), (status = 400, description = "Bad Request")))]
pub async fn post_news(
    State(state): State<AppState>,
    Json(input): Json<PublishInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (title, content, author) = match (input.title, input.content, input.author) {
        (Some(t), Some(c), Some(a)) => (t, c, a),
        _ => return Err(ApiError::bad_request("Missing required fields")),
    };
    let story = state
        .news
        .publish(&title, &content, &author, input.timestamp)
        .await?;

    // Push to every connected feed client. Send failure just means nobody
    // is listening right now.
    let receivers = state
        .feed
        .send(FeedFrame { origin: None, event: FeedEvent::NewStory(story.clone()) })
        .unwrap_or(0);
    debug!(story = %story.id, receivers, "story broadcast");

    Ok(Json(serde_json::json!({"success": true, "story": story})))
}
