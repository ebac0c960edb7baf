// PostgreSQL repository implementations using sqlx
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::db::repository::{
    CommentRepository, FollowRepository, ListingRepository, MentorshipRepository,
    OrganizationRepository, PostRepository, UserRepository, VoteRepository,
};
use crate::models::listing::ListingFilter;
use crate::models::post::PostWithVotes;
use crate::models::{
    Comment, CommentWithAuthor, Follow, Listing, ListingKind, ListingWithOrg, MentorshipSession,
    Organization, Post, PostWithAuthor, SessionWithParties, User, Vote, VoteTally, VoteType,
};
use crate::{AppError, Result};

// PostgreSQL connection pool wrapper
pub struct PostgresDatabase {
    pub pool: Arc<PgPool>,
}

impl PostgresDatabase {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(3600))
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to connect to PostgreSQL: {}", e))
            })?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to run migrations: {}", e)))?;

        tracing::info!("Database connection pool ready");

        Ok(Self { pool: Arc::new(pool) })
    }

    pub fn user_repo(&self) -> PostgresUserRepository {
        PostgresUserRepository { pool: self.pool.clone() }
    }

    pub fn follow_repo(&self) -> PostgresFollowRepository {
        PostgresFollowRepository { pool: self.pool.clone() }
    }

    pub fn post_repo(&self) -> PostgresPostRepository {
        PostgresPostRepository { pool: self.pool.clone() }
    }

    pub fn comment_repo(&self) -> PostgresCommentRepository {
        PostgresCommentRepository { pool: self.pool.clone() }
    }

    pub fn vote_repo(&self) -> PostgresVoteRepository {
        PostgresVoteRepository { pool: self.pool.clone() }
    }

    pub fn organization_repo(&self) -> PostgresOrganizationRepository {
        PostgresOrganizationRepository { pool: self.pool.clone() }
    }

    pub fn listing_repo(&self) -> PostgresListingRepository {
        PostgresListingRepository { pool: self.pool.clone() }
    }

    pub fn mentorship_repo(&self) -> PostgresMentorshipRepository {
        PostgresMentorshipRepository { pool: self.pool.clone() }
    }
}

const USER_COLUMNS: &str = "user_id, username, email, password_hash, name, bio, profile_picture, \
     school, company, role, mentorship_availability, credits, created_at, updated_at";

// PostgreSQL User Repository
pub struct PostgresUserRepository {
    pool: Arc<PgPool>,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, user: &User) -> Result<User> {
        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.user_id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.name)
            .bind(&user.bio)
            .bind(&user.profile_picture)
            .bind(&user.school)
            .bind(&user.company)
            .bind(&user.role)
            .bind(user.mentorship_availability)
            .bind(user.credits)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create user: {}", e)))
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get user by id: {}", e)))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get user by email: {}", e)))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get user by username: {}", e)))
    }

    async fn update_profile(&self, user: &User) -> Result<User> {
        let sql = format!(
            "UPDATE users \
             SET name = $2, bio = $3, profile_picture = $4, school = $5, company = $6, role = $7, \
                 updated_at = now() \
             WHERE user_id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.user_id)
            .bind(&user.name)
            .bind(&user.bio)
            .bind(&user.profile_picture)
            .bind(&user.school)
            .bind(&user.company)
            .bind(&user.role)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to update profile: {}", e)))
    }

    async fn set_mentorship_availability(&self, id: Uuid, available: bool) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users SET mentorship_availability = $2, updated_at = now() WHERE user_id = $1",
        )
        .bind(id)
        .bind(available)
        .execute(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update availability: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    async fn get_available_mentors(&self, exclude: Uuid) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE mentorship_availability = TRUE AND user_id <> $1 \
             ORDER BY username"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(exclude)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list mentors: {}", e)))
    }

    async fn get_credits(&self, id: Uuid) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT credits FROM users WHERE user_id = $1")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get credits: {}", e)))?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn charge_credits(&self, id: Uuid, amount: i64) -> Result<i64> {
        // The balance guard is part of the UPDATE so two concurrent charges
        // can never drive the balance negative.
        let remaining = sqlx::query_scalar::<_, i64>(
            "UPDATE users SET credits = credits - $2, updated_at = now() \
             WHERE user_id = $1 AND credits >= $2 \
             RETURNING credits",
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to charge credits: {}", e)))?;

        match remaining {
            Some(credits) => Ok(credits),
            None => {
                // Distinguish a missing user from an underfunded one.
                self.get_credits(id).await?;
                Err(AppError::Forbidden("Insufficient credits".to_string()))
            }
        }
    }

    async fn add_credits(&self, id: Uuid, amount: i64) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE users SET credits = credits + $2, updated_at = now() \
             WHERE user_id = $1 \
             RETURNING credits",
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to add credits: {}", e)))?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

// PostgreSQL Follow Repository
pub struct PostgresFollowRepository {
    pool: Arc<PgPool>,
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn follow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<Follow> {
        sqlx::query_as::<_, Follow>(
            "INSERT INTO follows (follow_id, follower_id, followed_id, created_at) \
             VALUES ($1, $2, $3, now()) \
             RETURNING follow_id, follower_id, followed_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(follower_id)
        .bind(followed_id)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create follow: {}", e)))
    }

    async fn unfollow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2")
                .bind(follower_id)
                .bind(followed_id)
                .execute(&*self.pool)
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to unfollow: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_following(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = $1 AND followed_id = $2)",
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to check follow: {}", e)))?;

        Ok(exists)
    }

    async fn followed_users(&self, follower_id: Uuid) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE user_id IN (SELECT followed_id FROM follows WHERE follower_id = $1) \
             ORDER BY username"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(follower_id)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list followed users: {}", e)))
    }
}

// PostgreSQL Post Repository
pub struct PostgresPostRepository {
    pool: Arc<PgPool>,
}

const POST_WITH_AUTHOR: &str = "SELECT p.post_id, p.user_id, p.title, p.content, p.image_url, \
     p.created_at, p.updated_at, u.username AS author_username, u.name AS author_name \
     FROM posts p JOIN users u ON u.user_id = p.user_id";

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, post: &Post, author_reward: i64) -> Result<(Post, i64)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to start transaction: {}", e)))?;

        let stored = sqlx::query_as::<_, Post>(
            "INSERT INTO posts (post_id, user_id, title, content, image_url, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING post_id, user_id, title, content, image_url, created_at, updated_at",
        )
        .bind(post.post_id)
        .bind(post.user_id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.image_url)
        .bind(post.created_at)
        .bind(post.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create post: {}", e)))?;

        let credits = sqlx::query_scalar::<_, i64>(
            "UPDATE users SET credits = credits + $2, updated_at = now() \
             WHERE user_id = $1 RETURNING credits",
        )
        .bind(post.user_id)
        .bind(author_reward)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to reward author: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit post: {}", e)))?;

        Ok((stored, credits))
    }

    async fn get_post_by_id(&self, id: Uuid) -> Result<Option<PostWithAuthor>> {
        let sql = format!("{POST_WITH_AUTHOR} WHERE p.post_id = $1");
        sqlx::query_as::<_, PostWithAuthor>(&sql)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get post: {}", e)))
    }

    async fn list_posts(&self) -> Result<Vec<PostWithAuthor>> {
        let sql = format!("{POST_WITH_AUTHOR} ORDER BY p.created_at DESC");
        sqlx::query_as::<_, PostWithAuthor>(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list posts: {}", e)))
    }

    async fn list_posts_by_votes(&self) -> Result<Vec<PostWithVotes>> {
        sqlx::query_as::<_, PostWithVotes>(
            "SELECT p.post_id, p.user_id, p.title, p.content, p.image_url, \
                    p.created_at, p.updated_at, u.username AS author_username, \
                    u.name AS author_name, COALESCE(v.vote_count, 0) AS vote_count \
             FROM posts p \
             JOIN users u ON u.user_id = p.user_id \
             LEFT JOIN (SELECT post_id, COUNT(*) AS vote_count FROM votes GROUP BY post_id) v \
               ON v.post_id = p.post_id \
             ORDER BY COALESCE(v.vote_count, 0) DESC, p.created_at DESC",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list posts by votes: {}", e)))
    }

    async fn list_posts_by_user(&self, user_id: Uuid) -> Result<Vec<PostWithAuthor>> {
        let sql = format!("{POST_WITH_AUTHOR} WHERE p.user_id = $1 ORDER BY p.created_at DESC");
        sqlx::query_as::<_, PostWithAuthor>(&sql)
            .bind(user_id)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list user posts: {}", e)))
    }

    async fn list_posts_by_followed(&self, follower_id: Uuid) -> Result<Vec<PostWithAuthor>> {
        let sql = format!(
            "{POST_WITH_AUTHOR} \
             WHERE p.user_id IN (SELECT followed_id FROM follows WHERE follower_id = $1) \
             ORDER BY p.created_at DESC"
        );
        sqlx::query_as::<_, PostWithAuthor>(&sql)
            .bind(follower_id)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list followed posts: {}", e)))
    }

    async fn delete_post(&self, id: Uuid) -> Result<()> {
        // Comments and votes cascade via their foreign keys.
        sqlx::query("DELETE FROM posts WHERE post_id = $1")
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete post: {}", e)))?;

        Ok(())
    }
}

// PostgreSQL Comment Repository
pub struct PostgresCommentRepository {
    pool: Arc<PgPool>,
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(&self, comment: &Comment) -> Result<Comment> {
        sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (comment_id, post_id, user_id, comment_text, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING comment_id, post_id, user_id, comment_text, created_at, updated_at",
        )
        .bind(comment.comment_id)
        .bind(comment.post_id)
        .bind(comment.user_id)
        .bind(&comment.comment_text)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create comment: {}", e)))
    }

    async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        sqlx::query_as::<_, CommentWithAuthor>(
            "SELECT c.comment_id, c.post_id, c.user_id, c.comment_text, c.created_at, \
                    c.updated_at, u.username AS author_username, u.name AS author_name \
             FROM comments c JOIN users u ON u.user_id = c.user_id \
             WHERE c.post_id = $1 \
             ORDER BY c.created_at ASC",
        )
        .bind(post_id)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list comments: {}", e)))
    }
}

// PostgreSQL Vote Repository
pub struct PostgresVoteRepository {
    pool: Arc<PgPool>,
}

#[derive(sqlx::FromRow)]
struct VoteRecord {
    vote_id: Uuid,
    post_id: Uuid,
    user_id: Uuid,
    vote_type: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<VoteRecord> for Vote {
    type Error = AppError;

    fn try_from(row: VoteRecord) -> Result<Self> {
        Ok(Vote {
            vote_id: row.vote_id,
            post_id: row.post_id,
            user_id: row.user_id,
            vote_type: row.vote_type.parse()?,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl VoteRepository for PostgresVoteRepository {
    async fn get_user_vote(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Vote>> {
        let row = sqlx::query_as::<_, VoteRecord>(
            "SELECT vote_id, post_id, user_id, vote_type, created_at \
             FROM votes WHERE post_id = $1 AND user_id = $2",
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to get vote: {}", e)))?;

        row.map(Vote::try_from).transpose()
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<Vote> {
        let row = sqlx::query_as::<_, VoteRecord>(
            "INSERT INTO votes (vote_id, post_id, user_id, vote_type, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING vote_id, post_id, user_id, vote_type, created_at",
        )
        .bind(vote.vote_id)
        .bind(vote.post_id)
        .bind(vote.user_id)
        .bind(vote.vote_type.as_str())
        .bind(vote.created_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert vote: {}", e)))?;

        Vote::try_from(row)
    }

    async fn update_vote_type(&self, vote_id: Uuid, vote_type: VoteType) -> Result<()> {
        sqlx::query("UPDATE votes SET vote_type = $2 WHERE vote_id = $1")
            .bind(vote_id)
            .bind(vote_type.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to update vote: {}", e)))?;

        Ok(())
    }

    async fn delete_vote(&self, post_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM votes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete vote: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn tally(&self, post_id: Uuid) -> Result<VoteTally> {
        let (upvotes, downvotes) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*) FILTER (WHERE vote_type = 'upvote'), \
                    COUNT(*) FILTER (WHERE vote_type = 'downvote') \
             FROM votes WHERE post_id = $1",
        )
        .bind(post_id)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to tally votes: {}", e)))?;

        Ok(VoteTally { upvotes, downvotes })
    }
}

// PostgreSQL Organization Repository
pub struct PostgresOrganizationRepository {
    pool: Arc<PgPool>,
}

#[async_trait]
impl OrganizationRepository for PostgresOrganizationRepository {
    async fn find_or_create(&self, name: &str) -> Result<Organization> {
        // Upsert keyed on the unique name; the no-op update lets RETURNING
        // yield the existing row.
        sqlx::query_as::<_, Organization>(
            "INSERT INTO organizations (organization_id, name, created_at) \
             VALUES ($1, $2, now()) \
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name \
             RETURNING organization_id, name, description, website, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to upsert organization: {}", e)))
    }
}

// PostgreSQL Listing Repository
pub struct PostgresListingRepository {
    pool: Arc<PgPool>,
}

#[derive(sqlx::FromRow)]
struct ListingRecord {
    listing_id: Uuid,
    kind: String,
    user_id: Uuid,
    organization_id: Option<Uuid>,
    title: String,
    description: String,
    requirements: Option<String>,
    amount: Option<i64>,
    application_link: Option<String>,
    deadline: DateTime<Utc>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ListingRecord> for Listing {
    type Error = AppError;

    fn try_from(row: ListingRecord) -> Result<Self> {
        Ok(Listing {
            listing_id: row.listing_id,
            kind: row.kind.parse()?,
            user_id: row.user_id,
            organization_id: row.organization_id,
            title: row.title,
            description: row.description,
            requirements: row.requirements,
            amount: row.amount,
            application_link: row.application_link,
            deadline: row.deadline,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ListingJoinRecord {
    listing_id: Uuid,
    kind: String,
    user_id: Uuid,
    organization_id: Option<Uuid>,
    title: String,
    description: String,
    requirements: Option<String>,
    amount: Option<i64>,
    application_link: Option<String>,
    deadline: DateTime<Utc>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    organization_name: Option<String>,
}

impl TryFrom<ListingJoinRecord> for ListingWithOrg {
    type Error = AppError;

    fn try_from(row: ListingJoinRecord) -> Result<Self> {
        let organization_name = row.organization_name.clone();
        let listing = Listing {
            listing_id: row.listing_id,
            kind: row.kind.parse()?,
            user_id: row.user_id,
            organization_id: row.organization_id,
            title: row.title,
            description: row.description,
            requirements: row.requirements,
            amount: row.amount,
            application_link: row.application_link,
            deadline: row.deadline,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };
        Ok(ListingWithOrg { listing, organization_name })
    }
}

const LISTING_COLUMNS: &str = "listing_id, kind, user_id, organization_id, title, description, \
     requirements, amount, application_link, deadline, status, created_at, updated_at";

const LISTING_WITH_ORG: &str = "SELECT l.listing_id, l.kind, l.user_id, l.organization_id, \
     l.title, l.description, l.requirements, l.amount, l.application_link, l.deadline, \
     l.status, l.created_at, l.updated_at, o.name AS organization_name \
     FROM listings l LEFT JOIN organizations o ON o.organization_id = l.organization_id";

fn collect_listings(rows: Vec<ListingJoinRecord>) -> Result<Vec<ListingWithOrg>> {
    rows.into_iter().map(ListingWithOrg::try_from).collect()
}

#[async_trait]
impl ListingRepository for PostgresListingRepository {
    async fn create_listing(&self, listing: &Listing, author_reward: i64) -> Result<(Listing, i64)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to start transaction: {}", e)))?;

        let sql = format!(
            "INSERT INTO listings ({LISTING_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {LISTING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ListingRecord>(&sql)
            .bind(listing.listing_id)
            .bind(listing.kind.as_str())
            .bind(listing.user_id)
            .bind(listing.organization_id)
            .bind(&listing.title)
            .bind(&listing.description)
            .bind(&listing.requirements)
            .bind(listing.amount)
            .bind(&listing.application_link)
            .bind(listing.deadline)
            .bind(listing.status.as_str())
            .bind(listing.created_at)
            .bind(listing.updated_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create listing: {}", e)))?;

        let credits = sqlx::query_scalar::<_, i64>(
            "UPDATE users SET credits = credits + $2, updated_at = now() \
             WHERE user_id = $1 RETURNING credits",
        )
        .bind(listing.user_id)
        .bind(author_reward)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to reward author: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit listing: {}", e)))?;

        Ok((Listing::try_from(row)?, credits))
    }

    async fn get_listing(&self, kind: ListingKind, id: Uuid) -> Result<Option<ListingWithOrg>> {
        let sql = format!("{LISTING_WITH_ORG} WHERE l.kind = $1 AND l.listing_id = $2");
        let row = sqlx::query_as::<_, ListingJoinRecord>(&sql)
            .bind(kind.as_str())
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get listing: {}", e)))?;

        row.map(ListingWithOrg::try_from).transpose()
    }

    async fn list_listings(&self, kind: ListingKind) -> Result<Vec<ListingWithOrg>> {
        let sql = format!(
            "{LISTING_WITH_ORG} WHERE l.kind = $1 AND l.status <> 'closed' ORDER BY l.deadline ASC"
        );
        let rows = sqlx::query_as::<_, ListingJoinRecord>(&sql)
            .bind(kind.as_str())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list listings: {}", e)))?;

        collect_listings(rows)
    }

    async fn filter_listings(
        &self,
        kind: ListingKind,
        filter: &ListingFilter,
    ) -> Result<Vec<ListingWithOrg>> {
        let mut builder: sqlx::QueryBuilder<sqlx::Postgres> =
            sqlx::QueryBuilder::new(LISTING_WITH_ORG);
        builder.push(" WHERE l.kind = ");
        builder.push_bind(kind.as_str());
        builder.push(" AND l.status <> 'closed'");

        if let Some(title) = &filter.title {
            builder.push(" AND l.title ILIKE ");
            builder.push_bind(format!("%{}%", title));
        }
        if let Some(organization) = &filter.organization {
            builder.push(" AND o.name ILIKE ");
            builder.push_bind(format!("%{}%", organization));
        }
        if let Some(min_amount) = filter.min_amount {
            builder.push(" AND l.amount >= ");
            builder.push_bind(min_amount);
        }
        builder.push(" ORDER BY l.deadline ASC");

        let rows = builder
            .build_query_as::<ListingJoinRecord>()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to filter listings: {}", e)))?;

        collect_listings(rows)
    }

    async fn listings_by_user(&self, kind: ListingKind, user_id: Uuid) -> Result<Vec<ListingWithOrg>> {
        let sql = format!(
            "{LISTING_WITH_ORG} WHERE l.kind = $1 AND l.user_id = $2 ORDER BY l.created_at DESC"
        );
        let rows = sqlx::query_as::<_, ListingJoinRecord>(&sql)
            .bind(kind.as_str())
            .bind(user_id)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list user listings: {}", e)))?;

        collect_listings(rows)
    }

    async fn update_listing(&self, listing: &Listing) -> Result<Listing> {
        let sql = format!(
            "UPDATE listings \
             SET title = $2, description = $3, requirements = $4, amount = $5, \
                 application_link = $6, deadline = $7, status = $8, updated_at = now() \
             WHERE listing_id = $1 \
             RETURNING {LISTING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ListingRecord>(&sql)
            .bind(listing.listing_id)
            .bind(&listing.title)
            .bind(&listing.description)
            .bind(&listing.requirements)
            .bind(listing.amount)
            .bind(&listing.application_link)
            .bind(listing.deadline)
            .bind(listing.status.as_str())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to update listing: {}", e)))?;

        Listing::try_from(row)
    }

    async fn delete_listing(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM listings WHERE listing_id = $1")
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete listing: {}", e)))?;

        Ok(())
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE listings SET status = 'expired', updated_at = now() \
             WHERE status = 'active' AND deadline < $1",
        )
        .bind(now)
        .execute(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to expire listings: {}", e)))?;

        Ok(result.rows_affected())
    }
}

// PostgreSQL Mentorship Repository
pub struct PostgresMentorshipRepository {
    pool: Arc<PgPool>,
}

#[derive(sqlx::FromRow)]
struct SessionRecord {
    session_id: Uuid,
    mentor_id: Uuid,
    mentee_id: Uuid,
    scheduled_time: DateTime<Utc>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SessionRecord> for MentorshipSession {
    type Error = AppError;

    fn try_from(row: SessionRecord) -> Result<Self> {
        Ok(MentorshipSession {
            session_id: row.session_id,
            mentor_id: row.mentor_id,
            mentee_id: row.mentee_id,
            scheduled_time: row.scheduled_time,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionJoinRecord {
    session_id: Uuid,
    mentor_id: Uuid,
    mentee_id: Uuid,
    scheduled_time: DateTime<Utc>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    mentor_name: String,
    mentor_email: String,
    mentee_name: String,
    mentee_email: String,
}

impl TryFrom<SessionJoinRecord> for SessionWithParties {
    type Error = AppError;

    fn try_from(row: SessionJoinRecord) -> Result<Self> {
        let session = MentorshipSession {
            session_id: row.session_id,
            mentor_id: row.mentor_id,
            mentee_id: row.mentee_id,
            scheduled_time: row.scheduled_time,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };
        Ok(SessionWithParties {
            session,
            mentor_name: row.mentor_name,
            mentor_email: row.mentor_email,
            mentee_name: row.mentee_name,
            mentee_email: row.mentee_email,
        })
    }
}

const SESSION_COLUMNS: &str =
    "session_id, mentor_id, mentee_id, scheduled_time, status, created_at, updated_at";

const SESSION_WITH_PARTIES: &str = "SELECT s.session_id, s.mentor_id, s.mentee_id, \
     s.scheduled_time, s.status, s.created_at, s.updated_at, \
     COALESCE(m.name, m.username) AS mentor_name, m.email AS mentor_email, \
     COALESCE(e.name, e.username) AS mentee_name, e.email AS mentee_email \
     FROM mentorship_sessions s \
     JOIN users m ON m.user_id = s.mentor_id \
     JOIN users e ON e.user_id = s.mentee_id";

#[async_trait]
impl MentorshipRepository for PostgresMentorshipRepository {
    async fn book_session(
        &self,
        session: &MentorshipSession,
        cost: i64,
    ) -> Result<(MentorshipSession, i64)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to start transaction: {}", e)))?;

        let remaining = sqlx::query_scalar::<_, i64>(
            "UPDATE users SET credits = credits - $2, updated_at = now() \
             WHERE user_id = $1 AND credits >= $2 \
             RETURNING credits",
        )
        .bind(session.mentee_id)
        .bind(cost)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to charge mentee: {}", e)))?;

        let Some(credits) = remaining else {
            // Transaction drops without commit, nothing was charged.
            return Err(AppError::Forbidden("Insufficient credits".to_string()));
        };

        let sql = format!(
            "INSERT INTO mentorship_sessions ({SESSION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {SESSION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(session.session_id)
            .bind(session.mentor_id)
            .bind(session.mentee_id)
            .bind(session.scheduled_time)
            .bind(session.status.as_str())
            .bind(session.created_at)
            .bind(session.updated_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to insert session: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit booking: {}", e)))?;

        Ok((MentorshipSession::try_from(row)?, credits))
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<MentorshipSession>> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM mentorship_sessions WHERE session_id = $1");
        let row = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get session: {}", e)))?;

        row.map(MentorshipSession::try_from).transpose()
    }

    async fn approve_session(&self, id: Uuid) -> Result<MentorshipSession> {
        let sql = format!(
            "UPDATE mentorship_sessions SET status = 'scheduled', updated_at = now() \
             WHERE session_id = $1 AND status = 'pending' \
             RETURNING {SESSION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to approve session: {}", e)))?
            .ok_or_else(|| {
                AppError::ValidationError("Only pending sessions can be approved".to_string())
            })?;

        MentorshipSession::try_from(row)
    }

    async fn cancel_session(&self, id: Uuid, refund: i64) -> Result<MentorshipSession> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to start transaction: {}", e)))?;

        let sql = format!(
            "UPDATE mentorship_sessions SET status = 'canceled', updated_at = now() \
             WHERE session_id = $1 AND status = 'pending' \
             RETURNING {SESSION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to cancel session: {}", e)))?
            .ok_or_else(|| {
                AppError::ValidationError("Only pending sessions can be canceled".to_string())
            })?;

        sqlx::query(
            "UPDATE users SET credits = credits + $2, updated_at = now() WHERE user_id = $1",
        )
        .bind(row.mentee_id)
        .bind(refund)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to refund mentee: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit cancellation: {}", e)))?;

        MentorshipSession::try_from(row)
    }

    async fn complete_session(&self, id: Uuid, reward: i64) -> Result<(MentorshipSession, i64)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to start transaction: {}", e)))?;

        let sql = format!(
            "UPDATE mentorship_sessions SET status = 'completed', updated_at = now() \
             WHERE session_id = $1 AND status = 'scheduled' \
             RETURNING {SESSION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to complete session: {}", e)))?
            .ok_or_else(|| {
                AppError::ValidationError("Only scheduled sessions can be completed".to_string())
            })?;

        let credits = sqlx::query_scalar::<_, i64>(
            "UPDATE users SET credits = credits + $2, updated_at = now() \
             WHERE user_id = $1 RETURNING credits",
        )
        .bind(row.mentor_id)
        .bind(reward)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to reward mentor: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit completion: {}", e)))?;

        Ok((MentorshipSession::try_from(row)?, credits))
    }

    async fn sessions_for_mentor(&self, mentor_id: Uuid) -> Result<Vec<SessionWithParties>> {
        let sql = format!("{SESSION_WITH_PARTIES} WHERE s.mentor_id = $1 ORDER BY s.scheduled_time");
        let rows = sqlx::query_as::<_, SessionJoinRecord>(&sql)
            .bind(mentor_id)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list mentor sessions: {}", e)))?;

        rows.into_iter().map(SessionWithParties::try_from).collect()
    }

    async fn sessions_for_mentee(&self, mentee_id: Uuid) -> Result<Vec<SessionWithParties>> {
        let sql = format!("{SESSION_WITH_PARTIES} WHERE s.mentee_id = $1 ORDER BY s.scheduled_time");
        let rows = sqlx::query_as::<_, SessionJoinRecord>(&sql)
            .bind(mentee_id)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list mentee sessions: {}", e)))?;

        rows.into_iter().map(SessionWithParties::try_from).collect()
    }
}
