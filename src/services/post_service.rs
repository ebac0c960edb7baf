use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::config::CreditPolicy;
use crate::db::repository::{CommentRepository, PostRepository, UserRepository, VoteRepository};
use crate::models::comment::{CommentResponse, CreateCommentRequest};
use crate::models::post::{CreatePostRequest, PostDetailResponse, PostResponse};
use crate::models::vote::VoteType;
use crate::models::{Comment, Post};
use crate::{AppError, Result};

pub struct PostService {
    post_repo: Arc<dyn PostRepository>,
    comment_repo: Arc<dyn CommentRepository>,
    vote_repo: Arc<dyn VoteRepository>,
    user_repo: Arc<dyn UserRepository>,
    policy: CreditPolicy,
}

impl PostService {
    pub fn new(
        post_repo: Arc<dyn PostRepository>,
        comment_repo: Arc<dyn CommentRepository>,
        vote_repo: Arc<dyn VoteRepository>,
        user_repo: Arc<dyn UserRepository>,
        policy: CreditPolicy,
    ) -> Self {
        Self {
            post_repo,
            comment_repo,
            vote_repo,
            user_repo,
            policy,
        }
    }

    /// Create a post and pay the posting reward in the same transaction.
    /// Returns the stored post and the author's new balance.
    pub async fn create_post(&self, request: CreatePostRequest, author_id: Uuid) -> Result<(Post, i64)> {
        if request.title.trim().is_empty() {
            return Err(AppError::ValidationError("Title is required".to_string()));
        }
        if request.content.trim().is_empty() {
            return Err(AppError::ValidationError("Content is required".to_string()));
        }

        let now = Utc::now();
        let post = Post {
            post_id: Uuid::new_v4(),
            user_id: author_id,
            title: request.title,
            content: request.content,
            image_url: request.image_url,
            created_at: now,
            updated_at: now,
        };

        self.post_repo.create_post(&post, self.policy.post_reward).await
    }

    /// The full feed, newest first. Reading it costs credits; the charge
    /// happens before the query and fails the request when underfunded.
    pub async fn feed(&self, viewer_id: Uuid) -> Result<(Vec<PostResponse>, i64)> {
        let credits = self
            .user_repo
            .charge_credits(viewer_id, self.policy.access_cost)
            .await?;

        let posts = self.post_repo.list_posts().await?;
        Ok((posts.into_iter().map(PostResponse::from).collect(), credits))
    }

    pub async fn top_posts(&self) -> Result<Vec<PostResponse>> {
        let posts = self.post_repo.list_posts_by_votes().await?;
        Ok(posts.into_iter().map(PostResponse::from).collect())
    }

    pub async fn followed_posts(&self, viewer_id: Uuid) -> Result<Vec<PostResponse>> {
        let posts = self.post_repo.list_posts_by_followed(viewer_id).await?;
        Ok(posts.into_iter().map(PostResponse::from).collect())
    }

    pub async fn user_posts(&self, user_id: Uuid) -> Result<Vec<PostResponse>> {
        let posts = self.post_repo.list_posts_by_user(user_id).await?;
        Ok(posts.into_iter().map(PostResponse::from).collect())
    }

    /// Single post with vote tallies, the viewer's own vote direction and
    /// the full comment thread.
    pub async fn post_detail(&self, post_id: Uuid, viewer_id: Uuid) -> Result<PostDetailResponse> {
        let post = self
            .post_repo
            .get_post_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        let tally = self.vote_repo.tally(post_id).await?;
        let viewer_vote = self.vote_repo.get_user_vote(post_id, viewer_id).await?;
        let user_has_upvoted = viewer_vote
            .as_ref()
            .map(|v| v.vote_type == VoteType::Upvote)
            .unwrap_or(false);
        let user_has_downvoted = viewer_vote
            .as_ref()
            .map(|v| v.vote_type == VoteType::Downvote)
            .unwrap_or(false);

        let comments = self
            .comment_repo
            .comments_for_post(post_id)
            .await?
            .into_iter()
            .map(CommentResponse::from)
            .collect();

        Ok(PostDetailResponse::new(
            PostResponse::from(post),
            tally,
            user_has_upvoted,
            user_has_downvoted,
            comments,
        ))
    }

    pub async fn delete_post(&self, post_id: Uuid, caller_id: Uuid) -> Result<()> {
        let post = self
            .post_repo
            .get_post_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        if post.user_id != caller_id {
            return Err(AppError::Forbidden(
                "You can only delete your own posts".to_string(),
            ));
        }

        self.post_repo.delete_post(post_id).await
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        request: CreateCommentRequest,
    ) -> Result<Comment> {
        if request.comment_text.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Comment text is required".to_string(),
            ));
        }

        self.post_repo
            .get_post_by_id(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        let now = Utc::now();
        let comment = Comment {
            comment_id: Uuid::new_v4(),
            post_id,
            user_id: author_id,
            comment_text: request.comment_text,
            created_at: now,
            updated_at: now,
        };

        self.comment_repo.create_comment(&comment).await
    }

    pub async fn comments(&self, post_id: Uuid) -> Result<Vec<CommentResponse>> {
        let comments = self.comment_repo.comments_for_post(post_id).await?;
        Ok(comments.into_iter().map(CommentResponse::from).collect())
    }
}
