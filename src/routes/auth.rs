use axum::{
    extract::{Json, State},
    response::Json as ResponseJson,
    Extension,
};
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::models::user::{CreateUserRequest, LoginRequest};
use crate::{AppState, Result};

pub async fn register(
    State(app_state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<ResponseJson<Value>> {
    let user = app_state
        .user_service
        .register(request, &app_state.auth_service)
        .await?;
    let token = app_state
        .auth_service
        .generate_token(user.user_id, &user.username)?;

    Ok(ResponseJson(json!({
        "user": user,
        "token": token,
        "message": "User registered successfully"
    })))
}

pub async fn login(
    State(app_state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<ResponseJson<Value>> {
    let (user, token) = app_state
        .user_service
        .authenticate(&request.email, &request.password, &app_state.auth_service)
        .await?;

    Ok(ResponseJson(json!({
        "user": user,
        "token": token,
        "message": "Login successful"
    })))
}

pub async fn me(Extension(auth): Extension<AuthUser>) -> ResponseJson<Value> {
    ResponseJson(json!({
        "authenticated": true,
        "user_id": auth.user_id,
        "username": auth.username
    }))
}
