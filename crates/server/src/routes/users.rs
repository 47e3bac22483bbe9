use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use models::profile::{canonical_email, Profile};
use serde::Deserialize;
use tracing::info;

use crate::errors::ApiError;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupInput {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[utoipa::path(post, path = "/api/signup", tag = "users", request_body = crate::openapi::SignupRequest, responses((status = 200, description = "Created"), (status = 400, description = "Bad Request"), (status = 409, description = "Already exists")))]
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupInput>,
) -> Result<Json<Profile>, ApiError> {
    let (name, email) = match (input.name, input.email) {
        (Some(n), Some(e)) => (n, e),
        _ => return Err(ApiError::bad_request("Name and email are required.")),
    };
    let profile = state.profiles.create(&name, &email).await?;
    Ok(Json(profile))
}

#[utoipa::path(get, path = "/api/user/{email}", tag = "users", responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    match state.profiles.get(&email).await {
        Some(profile) => Ok(Json(profile)),
        None => Err(ApiError::new(StatusCode::NOT_FOUND, "User not found.")),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBalanceInput {
    pub email: Option<String>,
    pub balance: Option<f64>,
    pub blocks_mined: Option<u64>,
    pub total_earned: Option<f64>,
}

#[utoipa::path(post, path = "/api/user/update-balance", tag = "users", request_body = crate::openapi::UpdateBalanceRequest, responses((status = 200, description = "OK"), (status = 400, description = "Bad Request"), (status = 404, description = "Not Found")))]
pub async fn update_balance(
    State(state): State<AppState>,
    Json(input): Json<UpdateBalanceInput>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (email, balance) = match (input.email, input.balance) {
        (Some(e), Some(b)) => (e, b),
        _ => return Err(ApiError::bad_request("Missing email or balance")),
    };
    let profile = state
        .profiles
        .update_balance(&email, balance, input.blocks_mined, input.total_earned)
        .await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "balance": profile.profcoin_balance,
    })))
}

#[utoipa::path(get, path = "/api/user/{email}/balance", tag = "users", responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get_balance(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let profile = state
        .profiles
        .get(&email)
        .await
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "User not found"))?;
    Ok(Json(serde_json::json!({
        "balance": profile.profcoin_balance,
        "blocksMined": profile.blocks_mined,
        "totalEarned": profile.total_earned,
    })))
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub email: Option<String>,
}

/// Accept a multipart `profileImage` upload, store it under the user's
/// upload directory and point the profile's `imageUrl` at it.
#[utoipa::path(post, path = "/api/upload-image", tag = "users", responses((status = 200, description = "Stored"), (status = 400, description = "Bad Request"), (status = 404, description = "Not Found")))]
pub async fn upload_image(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let email = query
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing email or file."))?;
    if !state.profiles.exists(&email).await {
        return Err(ApiError::new(StatusCode::NOT_FOUND, "User not found"));
    }

    let mut image: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        if field.name() == Some("profileImage") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(e.to_string()))?;
            image = Some(bytes.to_vec());
        }
    }
    let image = image.ok_or_else(|| ApiError::bad_request("Missing email or file."))?;

    // One image per user, always profile.jpg; a re-upload replaces it.
    // The directory is named by the canonical email; the URL carries the
    // encoded form, which the static file layer decodes back to the same
    // directory name.
    let key = canonical_email(&email);
    let user_dir = state.upload_dir.join(&key);
    tokio::fs::create_dir_all(&user_dir)
        .await
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    tokio::fs::write(user_dir.join("profile.jpg"), &image)
        .await
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let image_url = format!("/uploads/{}/profile.jpg", urlencoding::encode(&key));
    state.profiles.set_image_url(&email, image_url.clone()).await?;
    info!(%email, bytes = image.len(), "profile image uploaded");

    Ok(Json(serde_json::json!({
        "success": true,
        "imageUrl": image_url,
    })))
}
