use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(utoipa::ToSchema)]
pub struct SignupRequest { pub name: String, pub email: String }

#[derive(utoipa::ToSchema)]
pub struct UpdateBalanceRequest {
    pub email: String,
    pub balance: f64,
    pub blocks_mined: Option<u64>,
    pub total_earned: Option<f64>,
}

#[derive(utoipa::ToSchema)]
pub struct TradeRequest {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
    pub note: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct TradeDecisionRequest {
    pub trade_id: String,
    pub status: String,
    pub user_email: String,
}

#[derive(utoipa::ToSchema)]
pub struct ClaimRequest {
    pub email: String,
    pub title: String,
    pub slot: Option<usize>,
}

#[derive(utoipa::ToSchema)]
pub struct SwapRequest {
    pub email: String,
    pub from: usize,
    pub to: usize,
}

#[derive(utoipa::ToSchema)]
pub struct SendMessageRequest {
    pub sender: String,
    pub recipient: String,
    pub message: String,
    pub timestamp: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct PublishRequest {
    pub title: String,
    pub content: String,
    pub author: String,
    pub timestamp: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::users::signup,
        crate::routes::users::get_user,
        crate::routes::users::update_balance,
        crate::routes::users::get_balance,
        crate::routes::users::upload_image,
        crate::routes::trades::create_trade,
        crate::routes::trades::list_pending,
        crate::routes::trades::trades_for_user,
        crate::routes::trades::update_trade,
        crate::routes::trades::cancel_trade,
        crate::routes::schedule::get_schedule,
        crate::routes::schedule::now_playing,
        crate::routes::schedule::claim,
        crate::routes::schedule::swap,
        crate::routes::schedule::release,
        crate::routes::messages::get_messages,
        crate::routes::messages::send_message,
        crate::routes::news::get_news,
        crate::routes::news::post_news,
    ),
    components(
        schemas(
            HealthResponse,
            SignupRequest,
            UpdateBalanceRequest,
            TradeRequest,
            TradeDecisionRequest,
            ClaimRequest,
            SwapRequest,
            SendMessageRequest,
            PublishRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "users"),
        (name = "trades"),
        (name = "schedule"),
        (name = "messages"),
        (name = "news")
    )
)]
pub struct ApiDoc;
