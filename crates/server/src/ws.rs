//! Real-time news feed over websocket.
//!
//! Every connected client is implicitly in the one feed room. Stories
//! published over REST fan out to all clients; `story-engagement` frames
//! sent by a client are relayed to every other client but never echoed
//! back: each frame carries the originating client id and the send loop
//! drops frames it originated.

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use models::story::Story;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::routes::AppState;

/// A server-to-client feed event, serialized as
/// `{"event": "...", "data": ...}`.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum FeedEvent {
    NewStory(Story),
    EngagementUpdated(serde_json::Value),
}

/// An event plus its origin. `origin: None` means the server published it
/// and every client should see it.
#[derive(Clone, Debug)]
pub struct FeedFrame {
    pub origin: Option<Uuid>,
    pub event: FeedEvent,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
enum ClientEvent {
    StoryEngagement(serde_json::Value),
}

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();
    let mut rx = state.feed.subscribe();
    let feed_tx = state.feed.clone();
    let (mut sink, mut stream) = socket.split();
    info!(%client_id, "feed client connected");

    let mut send_task = tokio::spawn(async move {
        while let Ok(frame) = rx.recv().await {
            if frame.origin == Some(client_id) {
                continue;
            }
            let Ok(text) = serde_json::to_string(&frame.event) else { continue };
            if sink.send(WsMessage::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = stream.next().await {
            let WsMessage::Text(text) = msg else { continue };
            match serde_json::from_str::<ClientEvent>(&text) {
                Ok(ClientEvent::StoryEngagement(data)) => {
                    let _ = feed_tx.send(FeedFrame {
                        origin: Some(client_id),
                        event: FeedEvent::EngagementUpdated(data),
                    });
                }
                Err(e) => debug!(%client_id, error = %e, "ignoring unrecognized feed frame"),
            }
        }
    });

    // Whichever side closes first tears down the other.
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
    info!(%client_id, "feed client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_story_event_shape() {
        let story = Story::new("t", "c", "a@x.c", None).expect("story");
        let v = serde_json::to_value(FeedEvent::NewStory(story)).expect("json");
        assert_eq!(v["event"], "new-story");
        assert_eq!(v["data"]["title"], "t");
    }

    #[test]
    fn engagement_event_shape() {
        let v = serde_json::to_value(FeedEvent::EngagementUpdated(
            serde_json::json!({"storyId": "abc", "likes": 3}),
        ))
        .expect("json");
        assert_eq!(v["event"], "engagement-updated");
        assert_eq!(v["data"]["likes"], 3);
    }

    #[test]
    fn client_engagement_frame_parses() {
        let frame = r#"{"event": "story-engagement", "data": {"storyId": "abc"}}"#;
        let parsed: ClientEvent = serde_json::from_str(frame).expect("parse");
        let ClientEvent::StoryEngagement(data) = parsed;
        assert_eq!(data["storyId"], "abc");
    }

    #[test]
    fn unknown_client_frames_are_rejected() {
        assert!(serde_json::from_str::<ClientEvent>(r#"{"event": "join-room"}"#).is_err());
        assert!(serde_json::from_str::<ClientEvent>("not json").is_err());
    }
}
