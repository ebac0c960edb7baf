use axum::{
    extract::{Json, Path, State},
    response::Json as ResponseJson,
    Extension,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::follow::FollowRequest;
use crate::models::user::UpdateProfileRequest;
use crate::{AppState, Result};

pub async fn get_profile(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<ResponseJson<Value>> {
    let profile = app_state.user_service.own_profile(auth.user_id).await?;
    Ok(ResponseJson(json!(profile)))
}

pub async fn update_profile(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<ResponseJson<Value>> {
    let updated = app_state
        .user_service
        .update_profile(auth.user_id, request)
        .await?;

    Ok(ResponseJson(json!({
        "message": "Profile updated successfully",
        "updated_profile": updated
    })))
}

pub async fn get_other_profile(
    State(app_state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<ResponseJson<Value>> {
    let (user, followings) = app_state.user_service.public_profile(user_id).await?;

    Ok(ResponseJson(json!({
        "user": user,
        "followings": followings
    })))
}

pub async fn follow(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<FollowRequest>,
) -> Result<ResponseJson<Value>> {
    let target = app_state
        .user_service
        .follow(auth.user_id, request.user_id)
        .await?;

    Ok(ResponseJson(json!({
        "message": "Successfully followed user",
        "following": {
            "user_id": target.user_id,
            "username": target.username
        }
    })))
}

pub async fn unfollow(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<FollowRequest>,
) -> Result<ResponseJson<Value>> {
    let target = app_state
        .user_service
        .unfollow(auth.user_id, request.user_id)
        .await?;

    Ok(ResponseJson(json!({
        "message": "Successfully unfollowed user",
        "unfollowed": {
            "user_id": target.user_id,
            "username": target.username
        }
    })))
}

pub async fn get_credits(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<ResponseJson<Value>> {
    let credits = app_state.user_service.credits(auth.user_id).await?;
    Ok(ResponseJson(json!({ "credits": credits })))
}
