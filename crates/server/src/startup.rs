use std::{env, net::SocketAddr, path::Path};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, AppState};
use service::{
    file::{
        message_store::MessageStore, news_store::NewsStore, profile_store::ProfileStore,
        schedule_store::ScheduleStore,
    },
    runtime,
    trade_book::TradeBook,
};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    // 前端直接跨域访问，放开 CORS
    CorsLayer::very_permissive()
}

/// Load config from configs or env vars, with sensible fallbacks
fn load_config() -> configs::AppConfig {
    match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "config file unavailable; falling back to env/defaults");
            let mut cfg = configs::AppConfig::default();
            if let Ok(host) = env::var("SERVER_HOST") {
                cfg.server.host = host;
            }
            if let Some(port) = env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
                cfg.server.port = port;
            }
            cfg.storage.normalize_from_env();
            cfg
        }
    }
}

fn bind_addr(cfg: &configs::AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad bind address: {e}")))
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = load_config();
    runtime::ensure_env(&cfg.storage.data_dir, &cfg.storage.upload_dir).await?;

    let data_dir = Path::new(&cfg.storage.data_dir);
    let profiles = ProfileStore::new(data_dir.join("profiles.json")).await?;
    let schedule = ScheduleStore::new(data_dir.join("schedule.json")).await?;
    let messages = MessageStore::new(data_dir.join("messages.json")).await?;
    let news = NewsStore::new(data_dir.join("news.json")).await?;
    let trades = TradeBook::new();

    // Feed broadcast channel; receivers come and go with ws clients.
    let (feed, _) = broadcast::channel(cfg.storage.feed_channel_capacity);

    let state = AppState {
        profiles,
        schedule,
        messages,
        news,
        trades,
        feed,
        upload_dir: cfg.storage.upload_dir.clone().into(),
    };

    let app: Router = routes::build_router(build_cors(), state);

    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting prof server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
