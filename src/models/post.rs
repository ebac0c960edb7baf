use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::comment::CommentResponse;
use crate::models::vote::VoteTally;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post joined with its author row, the shape most reads return.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostWithAuthor {
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_username: String,
    pub author_name: Option<String>,
}

/// Feed entry for the top-voted listing, carries the vote count used to rank.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostWithVotes {
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_username: String,
    pub author_name: Option<String>,
    pub vote_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub author_id: Uuid,
    pub author: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_count: Option<i64>,
}

impl From<PostWithAuthor> for PostResponse {
    fn from(post: PostWithAuthor) -> Self {
        let author = post
            .author_name
            .unwrap_or_else(|| post.author_username.clone());
        Self {
            id: post.post_id,
            title: post.title,
            content: post.content,
            image_url: post.image_url,
            author_id: post.user_id,
            author,
            created_at: post.created_at,
            vote_count: None,
        }
    }
}

impl From<PostWithVotes> for PostResponse {
    fn from(post: PostWithVotes) -> Self {
        let author = post
            .author_name
            .unwrap_or_else(|| post.author_username.clone());
        Self {
            id: post.post_id,
            title: post.title,
            content: post.content,
            image_url: post.image_url,
            author_id: post.user_id,
            author,
            created_at: post.created_at,
            vote_count: Some(post.vote_count),
        }
    }
}

/// Single-post view: the post plus vote tallies, the caller's own vote
/// direction and the comment thread.
#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub upvotes: i64,
    pub downvotes: i64,
    pub user_has_upvoted: bool,
    pub user_has_downvoted: bool,
    pub comments: Vec<CommentResponse>,
}

impl PostDetailResponse {
    pub fn new(
        post: PostResponse,
        tally: VoteTally,
        user_has_upvoted: bool,
        user_has_downvoted: bool,
        comments: Vec<CommentResponse>,
    ) -> Self {
        Self {
            post,
            upvotes: tally.upvotes,
            downvotes: tally.downvotes,
            user_has_upvoted,
            user_has_downvoted,
            comments,
        }
    }
}
