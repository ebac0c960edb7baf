use axum::{
    extract::{Json, Path, Query, State},
    response::Json as ResponseJson,
    Extension,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::listing::{CreateListingRequest, ListingFilter, UpdateListingRequest};
use crate::models::ListingKind;
use crate::{AppState, Result};

// Scholarship and internship routes share the handlers below; each pair of
// public functions just pins the kind.

async fn browse(
    app_state: AppState,
    auth: AuthUser,
    kind: ListingKind,
) -> Result<ResponseJson<Value>> {
    let (listings, credits) = app_state.listing_service.browse(kind, auth.user_id).await?;

    Ok(ResponseJson(json!({
        "credits": credits,
        "listings": listings
    })))
}

async fn create(
    app_state: AppState,
    auth: AuthUser,
    kind: ListingKind,
    request: CreateListingRequest,
) -> Result<ResponseJson<Value>> {
    let (listing, credits) = app_state
        .listing_service
        .create(kind, auth.user_id, request)
        .await?;

    Ok(ResponseJson(json!({
        "message": format!("{} posted", capitalize(kind)),
        "listing_id": listing.listing_id,
        "credits": credits
    })))
}

async fn detail(
    app_state: AppState,
    auth: AuthUser,
    kind: ListingKind,
    listing_id: Uuid,
) -> Result<ResponseJson<Value>> {
    let (listing, credits) = app_state
        .listing_service
        .detail(kind, listing_id, auth.user_id)
        .await?;

    Ok(ResponseJson(json!({
        "credits": credits,
        "listing": listing
    })))
}

async fn filter(
    app_state: AppState,
    auth: AuthUser,
    kind: ListingKind,
    params: ListingFilter,
) -> Result<ResponseJson<Value>> {
    let (listings, credits) = app_state
        .listing_service
        .filter(kind, auth.user_id, params)
        .await?;

    Ok(ResponseJson(json!({
        "credits": credits,
        "listings": listings
    })))
}

async fn mine(
    app_state: AppState,
    auth: AuthUser,
    kind: ListingKind,
) -> Result<ResponseJson<Value>> {
    let listings = app_state.listing_service.mine(kind, auth.user_id).await?;
    Ok(ResponseJson(json!({ "listings": listings })))
}

async fn update(
    app_state: AppState,
    auth: AuthUser,
    kind: ListingKind,
    listing_id: Uuid,
    request: UpdateListingRequest,
) -> Result<ResponseJson<Value>> {
    app_state
        .listing_service
        .update(kind, listing_id, auth.user_id, request)
        .await?;

    Ok(ResponseJson(json!({
        "message": format!("{} updated", capitalize(kind))
    })))
}

async fn delete(
    app_state: AppState,
    auth: AuthUser,
    kind: ListingKind,
    listing_id: Uuid,
) -> Result<ResponseJson<Value>> {
    app_state
        .listing_service
        .delete(kind, listing_id, auth.user_id)
        .await?;

    Ok(ResponseJson(json!({
        "message": format!("{} deleted", capitalize(kind))
    })))
}

fn capitalize(kind: ListingKind) -> &'static str {
    match kind {
        ListingKind::Scholarship => "Scholarship",
        ListingKind::Internship => "Internship",
    }
}

pub async fn get_scholarships(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<ResponseJson<Value>> {
    browse(app_state, auth, ListingKind::Scholarship).await
}

pub async fn create_scholarship(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<CreateListingRequest>,
) -> Result<ResponseJson<Value>> {
    create(app_state, auth, ListingKind::Scholarship, request).await
}

pub async fn get_scholarship(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(listing_id): Path<Uuid>,
) -> Result<ResponseJson<Value>> {
    detail(app_state, auth, ListingKind::Scholarship, listing_id).await
}

pub async fn filter_scholarships(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<ListingFilter>,
) -> Result<ResponseJson<Value>> {
    filter(app_state, auth, ListingKind::Scholarship, params).await
}

pub async fn my_scholarships(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<ResponseJson<Value>> {
    mine(app_state, auth, ListingKind::Scholarship).await
}

pub async fn update_scholarship(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(listing_id): Path<Uuid>,
    Json(request): Json<UpdateListingRequest>,
) -> Result<ResponseJson<Value>> {
    update(app_state, auth, ListingKind::Scholarship, listing_id, request).await
}

pub async fn delete_scholarship(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(listing_id): Path<Uuid>,
) -> Result<ResponseJson<Value>> {
    delete(app_state, auth, ListingKind::Scholarship, listing_id).await
}

pub async fn get_internships(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<ResponseJson<Value>> {
    browse(app_state, auth, ListingKind::Internship).await
}

pub async fn create_internship(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<CreateListingRequest>,
) -> Result<ResponseJson<Value>> {
    create(app_state, auth, ListingKind::Internship, request).await
}

pub async fn get_internship(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(listing_id): Path<Uuid>,
) -> Result<ResponseJson<Value>> {
    detail(app_state, auth, ListingKind::Internship, listing_id).await
}

pub async fn filter_internships(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<ListingFilter>,
) -> Result<ResponseJson<Value>> {
    filter(app_state, auth, ListingKind::Internship, params).await
}

pub async fn my_internships(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<ResponseJson<Value>> {
    mine(app_state, auth, ListingKind::Internship).await
}

pub async fn update_internship(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(listing_id): Path<Uuid>,
    Json(request): Json<UpdateListingRequest>,
) -> Result<ResponseJson<Value>> {
    update(app_state, auth, ListingKind::Internship, listing_id, request).await
}

pub async fn delete_internship(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(listing_id): Path<Uuid>,
) -> Result<ResponseJson<Value>> {
    delete(app_state, auth, ListingKind::Internship, listing_id).await
}
