use axum::{
    extract::{Json, Path, State},
    response::Json as ResponseJson,
    Extension,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::comment::CreateCommentRequest;
use crate::models::post::CreatePostRequest;
use crate::models::vote::VoteRequest;
use crate::{AppState, Result};

pub async fn create_post(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(request): Json<CreatePostRequest>,
) -> Result<ResponseJson<Value>> {
    let (post, credits) = app_state
        .post_service
        .create_post(request, auth.user_id)
        .await?;

    Ok(ResponseJson(json!({
        "message": "Post added",
        "post": {
            "id": post.post_id,
            "title": post.title,
            "content": post.content
        },
        "credits": credits
    })))
}

pub async fn get_posts(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<ResponseJson<Value>> {
    let (posts, credits) = app_state.post_service.feed(auth.user_id).await?;

    Ok(ResponseJson(json!({
        "posts": posts,
        "credits": credits
    })))
}

pub async fn get_top_posts(State(app_state): State<AppState>) -> Result<ResponseJson<Value>> {
    let posts = app_state.post_service.top_posts().await?;
    Ok(ResponseJson(json!({ "posts": posts })))
}

pub async fn get_followed_posts(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<ResponseJson<Value>> {
    let posts = app_state.post_service.followed_posts(auth.user_id).await?;
    Ok(ResponseJson(json!({ "posts": posts })))
}

pub async fn get_user_posts(
    State(app_state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<ResponseJson<Value>> {
    let posts = app_state.post_service.user_posts(user_id).await?;
    Ok(ResponseJson(json!({ "posts": posts })))
}

pub async fn get_post(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
) -> Result<ResponseJson<Value>> {
    let detail = app_state
        .post_service
        .post_detail(post_id, auth.user_id)
        .await?;

    Ok(ResponseJson(json!(detail)))
}

pub async fn delete_post(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
) -> Result<ResponseJson<Value>> {
    app_state
        .post_service
        .delete_post(post_id, auth.user_id)
        .await?;

    Ok(ResponseJson(json!({
        "message": "Post deleted successfully"
    })))
}

pub async fn cast_vote(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
    Json(request): Json<VoteRequest>,
) -> Result<ResponseJson<Value>> {
    let (outcome, tally) = app_state
        .vote_service
        .cast_vote(post_id, auth.user_id, &request.vote_type)
        .await?;

    Ok(ResponseJson(json!({
        "message": format!("Vote {} successfully", outcome.as_str()),
        "votes": {
            "upvotes": tally.upvotes,
            "downvotes": tally.downvotes,
            "total": tally.net()
        }
    })))
}

pub async fn remove_vote(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
) -> Result<ResponseJson<Value>> {
    let tally = app_state
        .vote_service
        .remove_vote(post_id, auth.user_id)
        .await?;

    Ok(ResponseJson(json!({
        "message": "Vote deleted successfully",
        "votes": {
            "upvotes": tally.upvotes,
            "downvotes": tally.downvotes,
            "total": tally.net()
        }
    })))
}

pub async fn get_votes(
    State(app_state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<ResponseJson<Value>> {
    let tally = app_state.vote_service.tally(post_id).await?;

    Ok(ResponseJson(json!({
        "post_id": post_id,
        "upvotes": tally.upvotes,
        "downvotes": tally.downvotes
    })))
}

pub async fn add_comment(
    State(app_state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(post_id): Path<Uuid>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<ResponseJson<Value>> {
    let comment = app_state
        .post_service
        .add_comment(post_id, auth.user_id, request)
        .await?;

    Ok(ResponseJson(json!({
        "message": "Comment added successfully",
        "comment_id": comment.comment_id
    })))
}

pub async fn get_comments(
    State(app_state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<ResponseJson<Value>> {
    let comments = app_state.post_service.comments(post_id).await?;

    Ok(ResponseJson(json!({
        "post_id": post_id,
        "comments": comments
    })))
}
