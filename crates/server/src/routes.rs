use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Json, Router,
};
use tokio::sync::broadcast;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::{
    file::{
        message_store::MessageStore, news_store::NewsStore, profile_store::ProfileStore,
        schedule_store::ScheduleStore,
    },
    trade_book::TradeBook,
};

use crate::openapi::ApiDoc;
use crate::ws::{self, FeedFrame};

pub mod users;
pub mod trades;
pub mod schedule;
pub mod messages;
pub mod news;

/// Shared handler state: one store per JSON file, the in-memory trade
/// book, and the feed broadcast channel.
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<ProfileStore>,
    pub schedule: Arc<ScheduleStore>,
    pub messages: Arc<MessageStore>,
    pub news: Arc<NewsStore>,
    pub trades: Arc<TradeBook>,
    pub feed: broadcast::Sender<FeedFrame>,
    pub upload_dir: PathBuf,
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// Build the full application router: API routes, uploaded files, the
/// websocket feed and the Swagger docs.
pub fn build_router(cors: CorsLayer, state: AppState) -> Router {
    let uploads = ServeDir::new(&state.upload_dir);

    let api = Router::new()
        .route("/api/signup", post(users::signup))
        .route("/api/user/update-balance", post(users::update_balance))
        .route("/api/user/:email", get(users::get_user))
        .route("/api/user/:email/balance", get(users::get_balance))
        .route("/api/upload-image", post(users::upload_image))
        .route("/api/trade", post(trades::create_trade))
        .route("/api/trade/update", post(trades::update_trade))
        .route("/api/trade/:trade_id", delete(trades::cancel_trade))
        .route("/api/trades", get(trades::list_pending))
        .route("/api/trades/:email", get(trades::trades_for_user))
        .route("/api/schedule", get(schedule::get_schedule))
        .route("/api/schedule/now", get(schedule::now_playing))
        .route("/api/schedule/claim", post(schedule::claim))
        .route("/api/schedule/swap", post(schedule::swap))
        .route("/api/schedule/:slot", delete(schedule::release))
        .route("/api/messages", get(messages::get_messages).post(messages::send_message))
        .route("/api/news", get(news::get_news).post(news::post_news))
        .route("/ws", get(ws::ws_handler));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .nest_service("/uploads", uploads)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
