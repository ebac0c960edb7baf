// Authentication middleware for protecting routes
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::auth::AuthUser;
use crate::{AppError, AppState};

/// Validates the bearer token and stores the caller's identity in request
/// extensions for handlers to pick up via `Extension<AuthUser>`.
pub async fn require_auth(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::AuthError("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| {
            AppError::AuthError("Authorization header must start with 'Bearer '".to_string())
        })?;

    let claims = app_state.auth_service.verify_token(token)?;

    request.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
        username: claims.username,
    });

    Ok(next.run(request).await)
}
