use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use futures_util::{SinkExt, Stream, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use reqwest::StatusCode as HttpStatusCode;
use server::routes::{self, AppState};
use service::{
    file::{
        message_store::MessageStore, news_store::NewsStore, profile_store::ProfileStore,
        schedule_store::ScheduleStore,
    },
    trade_book::TradeBook,
};

struct TestApp {
    base_url: String,
    ws_url: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let temp_id = Uuid::new_v4();
    let data_dir = std::env::temp_dir().join(format!("prof-feed-{temp_id}"));
    let upload_dir = data_dir.join("uploads");
    tokio::fs::create_dir_all(&upload_dir).await?;

    let state = AppState {
        profiles: ProfileStore::new(data_dir.join("profiles.json")).await?,
        schedule: ScheduleStore::new(data_dir.join("schedule.json")).await?,
        messages: MessageStore::new(data_dir.join("messages.json")).await?,
        news: NewsStore::new(data_dir.join("news.json")).await?,
        trades: TradeBook::new(),
        feed: broadcast::channel(16).0,
        upload_dir,
    };

    let app: Router = routes::build_router(CorsLayer::very_permissive(), state);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());
    let ws_url = format!("ws://{}:{}/ws", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {e}");
        }
    });

    Ok(TestApp { base_url, ws_url })
}

async fn next_json<S>(ws: &mut S) -> anyhow::Result<serde_json::Value>
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let msg = timeout(Duration::from_secs(5), ws.next())
            .await?
            .ok_or_else(|| anyhow::anyhow!("feed closed"))??;
        if let Message::Text(text) = msg {
            return Ok(serde_json::from_str(&text)?);
        }
    }
}

#[tokio::test]
async fn published_stories_reach_every_client() -> anyhow::Result<()> {
    let app = start_server().await?;
    let (mut a, _) = connect_async(&app.ws_url).await?;
    let (mut b, _) = connect_async(&app.ws_url).await?;
    // let both subscriptions land before publishing
    sleep(Duration::from_millis(100)).await;

    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/api/news", app.base_url))
        .json(&json!({
            "title": "station back on air",
            "content": "new transmitter installed",
            "author": "ed@campus.edu",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    for ws in [&mut a, &mut b] {
        let frame = next_json(ws).await?;
        assert_eq!(frame["event"], "new-story");
        assert_eq!(frame["data"]["title"], "station back on air");
        assert_eq!(frame["data"]["likes"], 0);
    }
    Ok(())
}

#[tokio::test]
async fn engagement_relay_skips_the_sender() -> anyhow::Result<()> {
    let app = start_server().await?;
    let (mut a, _) = connect_async(&app.ws_url).await?;
    let (mut b, _) = connect_async(&app.ws_url).await?;
    sleep(Duration::from_millis(100)).await;

    a.send(Message::Text(
        json!({"event": "story-engagement", "data": {"storyId": "s1", "likes": 4}}).to_string(),
    ))
    .await?;

    // the other client sees the relay
    let frame = next_json(&mut b).await?;
    assert_eq!(frame["event"], "engagement-updated");
    assert_eq!(frame["data"]["storyId"], "s1");
    assert_eq!(frame["data"]["likes"], 4);

    // the sender never gets its own frame back
    assert!(timeout(Duration::from_millis(300), a.next()).await.is_err());
    Ok(())
}

#[tokio::test]
async fn unrecognized_frames_do_not_break_the_feed() -> anyhow::Result<()> {
    let app = start_server().await?;
    let (mut a, _) = connect_async(&app.ws_url).await?;
    let (mut b, _) = connect_async(&app.ws_url).await?;
    sleep(Duration::from_millis(100)).await;

    a.send(Message::Text("not json at all".into())).await?;
    a.send(Message::Text(
        json!({"event": "story-engagement", "data": {"storyId": "s2"}}).to_string(),
    ))
    .await?;

    // the garbage frame is dropped; the next valid one still relays
    let frame = next_json(&mut b).await?;
    assert_eq!(frame["event"], "engagement-updated");
    assert_eq!(frame["data"]["storyId"], "s2");
    Ok(())
}
