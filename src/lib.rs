// Library modules for the financial literacy marketplace backend
pub mod config;
pub mod models;
pub mod db;
pub mod routes;
pub mod services;
pub mod jobs;
pub mod auth;
pub mod error;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use config::{AppConfig, CreditPolicy};

// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub auth_service: std::sync::Arc<auth::AuthService>,
    pub user_service: std::sync::Arc<services::UserService>,
    pub post_service: std::sync::Arc<services::PostService>,
    pub vote_service: std::sync::Arc<services::VoteService>,
    pub listing_service: std::sync::Arc<services::ListingService>,
    pub mentorship_service: std::sync::Arc<services::MentorshipService>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let db = db::DatabaseClient::new(&config).await?;
        Ok(Self::with_database(config, db))
    }

    /// Wire services onto an existing set of repositories. Tests use this
    /// with in-memory repositories instead of PostgreSQL.
    pub fn with_database(config: AppConfig, db: db::DatabaseClient) -> Self {
        let auth_service = std::sync::Arc::new(auth::AuthService::new(config.jwt_secret.clone()));
        let mail_service = std::sync::Arc::new(services::MailService::from_config(&config));

        let user_service = std::sync::Arc::new(services::UserService::new(
            db.user_repo.clone(),
            db.follow_repo.clone(),
            config.credits.initial_credits,
        ));
        let post_service = std::sync::Arc::new(services::PostService::new(
            db.post_repo.clone(),
            db.comment_repo.clone(),
            db.vote_repo.clone(),
            db.user_repo.clone(),
            config.credits.clone(),
        ));
        let vote_service = std::sync::Arc::new(services::VoteService::new(
            db.vote_repo.clone(),
            db.post_repo.clone(),
        ));
        let listing_service = std::sync::Arc::new(services::ListingService::new(
            db.listing_repo.clone(),
            db.organization_repo.clone(),
            db.user_repo.clone(),
            config.credits.clone(),
        ));
        let mentorship_service = std::sync::Arc::new(services::MentorshipService::new(
            db.mentorship_repo.clone(),
            db.user_repo.clone(),
            mail_service,
            config.credits.clone(),
        ));

        Self {
            config,
            auth_service,
            user_service,
            post_service,
            vote_service,
            listing_service,
            mentorship_service,
        }
    }
}
