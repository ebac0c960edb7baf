pub mod postgres;
pub mod repository;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::Result;
use repository::{
    CommentRepository, FollowRepository, ListingRepository, MentorshipRepository,
    OrganizationRepository, PostRepository, UserRepository, VoteRepository,
};

// Database connection and repository handles shared across services
#[derive(Clone)]
pub struct DatabaseClient {
    pub user_repo: Arc<dyn UserRepository>,
    pub follow_repo: Arc<dyn FollowRepository>,
    pub post_repo: Arc<dyn PostRepository>,
    pub comment_repo: Arc<dyn CommentRepository>,
    pub vote_repo: Arc<dyn VoteRepository>,
    pub organization_repo: Arc<dyn OrganizationRepository>,
    pub listing_repo: Arc<dyn ListingRepository>,
    pub mentorship_repo: Arc<dyn MentorshipRepository>,
}

impl DatabaseClient {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let db = postgres::PostgresDatabase::new(&config.database_url).await?;

        Ok(Self {
            user_repo: Arc::new(db.user_repo()),
            follow_repo: Arc::new(db.follow_repo()),
            post_repo: Arc::new(db.post_repo()),
            comment_repo: Arc::new(db.comment_repo()),
            vote_repo: Arc::new(db.vote_repo()),
            organization_repo: Arc::new(db.organization_repo()),
            listing_repo: Arc::new(db.listing_repo()),
            mentorship_repo: Arc::new(db.mentorship_repo()),
        })
    }
}
