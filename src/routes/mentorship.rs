use axum::{
    extract::{Json, Path, State},
    response::Json as ResponseJson,
    Extension,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::mentorship::{AvailabilityRequest, BookSessionRequest, ReviewSessionRequest};
use crate::services::mentorship_service::ReviewDecision;
use crate::{AppState, Result};

pub async fn get_available_mentors(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<ResponseJson<Value>> {
    let mentors = app_state
        .mentorship_service
        .available_mentors(auth.user_id)
        .await?;

    Ok(ResponseJson(json!({ "mentors": mentors })))
}

pub async fn set_availability(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<AvailabilityRequest>,
) -> Result<ResponseJson<Value>> {
    app_state
        .mentorship_service
        .set_availability(auth.user_id, request.available)
        .await?;

    Ok(ResponseJson(json!({
        "message": "Availability updated successfully"
    })))
}

pub async fn book_session(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<BookSessionRequest>,
) -> Result<ResponseJson<Value>> {
    let (session, credits) = app_state
        .mentorship_service
        .book(auth.user_id, request)
        .await?;

    Ok(ResponseJson(json!({
        "message": "Mentorship session booked successfully",
        "session_id": session.session_id,
        "credits": credits
    })))
}

pub async fn review_session(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ReviewSessionRequest>,
) -> Result<ResponseJson<Value>> {
    let decision = ReviewDecision::parse(&request.decision)?;
    let session = app_state
        .mentorship_service
        .review(session_id, auth.user_id, decision)
        .await?;

    Ok(ResponseJson(json!({
        "message": format!("Mentorship session {}", session.status),
        "session_id": session.session_id,
        "status": session.status
    })))
}

pub async fn complete_session(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(session_id): Path<Uuid>,
) -> Result<ResponseJson<Value>> {
    let (_session, credits) = app_state
        .mentorship_service
        .complete(session_id, auth.user_id)
        .await?;

    Ok(ResponseJson(json!({
        "message": "Mentorship session completed",
        "credits": credits
    })))
}

pub async fn mentor_requests(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<ResponseJson<Value>> {
    let sessions = app_state
        .mentorship_service
        .mentor_requests(auth.user_id)
        .await?;

    Ok(ResponseJson(json!({ "sessions": sessions })))
}

pub async fn mentee_sessions(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<ResponseJson<Value>> {
    let sessions = app_state
        .mentorship_service
        .mentee_sessions(auth.user_id)
        .await?;

    Ok(ResponseJson(json!({ "sessions": sessions })))
}
