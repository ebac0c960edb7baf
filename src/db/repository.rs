// Repository trait abstractions for database operations
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    Comment, CommentWithAuthor, Follow, Listing, ListingKind, ListingWithOrg, MentorshipSession,
    Organization, Post, PostWithAuthor, SessionWithParties, User, Vote, VoteTally, VoteType,
};
use crate::models::listing::ListingFilter;
use crate::models::post::PostWithVotes;
use crate::Result;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<User>;
    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn update_profile(&self, user: &User) -> Result<User>;
    async fn set_mentorship_availability(&self, id: Uuid, available: bool) -> Result<()>;
    async fn get_available_mentors(&self, exclude: Uuid) -> Result<Vec<User>>;
    async fn get_credits(&self, id: Uuid) -> Result<i64>;
    /// Atomically deduct `amount` from the user's balance. Fails with
    /// `Forbidden` when the balance is lower than `amount`, leaving the
    /// balance untouched. Returns the remaining balance.
    async fn charge_credits(&self, id: Uuid, amount: i64) -> Result<i64>;
    /// Credit the user's balance and return the new total.
    async fn add_credits(&self, id: Uuid, amount: i64) -> Result<i64>;
}

#[async_trait]
pub trait FollowRepository: Send + Sync {
    async fn follow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<Follow>;
    /// Returns false when no edge existed.
    async fn unfollow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool>;
    async fn is_following(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool>;
    async fn followed_users(&self, follower_id: Uuid) -> Result<Vec<User>>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert the post and reward its author in one transaction.
    /// Returns the stored post and the author's new balance.
    async fn create_post(&self, post: &Post, author_reward: i64) -> Result<(Post, i64)>;
    async fn get_post_by_id(&self, id: Uuid) -> Result<Option<PostWithAuthor>>;
    async fn list_posts(&self) -> Result<Vec<PostWithAuthor>>;
    async fn list_posts_by_votes(&self) -> Result<Vec<PostWithVotes>>;
    async fn list_posts_by_user(&self, user_id: Uuid) -> Result<Vec<PostWithAuthor>>;
    async fn list_posts_by_followed(&self, follower_id: Uuid) -> Result<Vec<PostWithAuthor>>;
    async fn delete_post(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create_comment(&self, comment: &Comment) -> Result<Comment>;
    async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>>;
}

#[async_trait]
pub trait VoteRepository: Send + Sync {
    async fn get_user_vote(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Vote>>;
    async fn insert_vote(&self, vote: &Vote) -> Result<Vote>;
    async fn update_vote_type(&self, vote_id: Uuid, vote_type: VoteType) -> Result<()>;
    /// Returns false when the user had no vote on the post.
    async fn delete_vote(&self, post_id: Uuid, user_id: Uuid) -> Result<bool>;
    async fn tally(&self, post_id: Uuid) -> Result<VoteTally>;
}

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn find_or_create(&self, name: &str) -> Result<Organization>;
}

#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Insert the listing and reward its author in one transaction.
    async fn create_listing(&self, listing: &Listing, author_reward: i64) -> Result<(Listing, i64)>;
    async fn get_listing(&self, kind: ListingKind, id: Uuid) -> Result<Option<ListingWithOrg>>;
    async fn list_listings(&self, kind: ListingKind) -> Result<Vec<ListingWithOrg>>;
    async fn filter_listings(
        &self,
        kind: ListingKind,
        filter: &ListingFilter,
    ) -> Result<Vec<ListingWithOrg>>;
    async fn listings_by_user(&self, kind: ListingKind, user_id: Uuid) -> Result<Vec<ListingWithOrg>>;
    async fn update_listing(&self, listing: &Listing) -> Result<Listing>;
    async fn delete_listing(&self, id: Uuid) -> Result<()>;
    /// Flip active listings whose deadline has passed to expired.
    /// Returns how many rows changed.
    async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<u64>;
}

#[async_trait]
pub trait MentorshipRepository: Send + Sync {
    /// Charge the mentee `cost` credits and insert the pending session in
    /// one transaction. Insufficient credits abort with `Forbidden` and
    /// nothing is persisted. Returns the session and the mentee's balance.
    async fn book_session(
        &self,
        session: &MentorshipSession,
        cost: i64,
    ) -> Result<(MentorshipSession, i64)>;
    async fn get_session(&self, id: Uuid) -> Result<Option<MentorshipSession>>;
    /// pending -> scheduled. The status guard lives in the UPDATE itself.
    async fn approve_session(&self, id: Uuid) -> Result<MentorshipSession>;
    /// pending -> canceled, refunding the mentee in the same transaction.
    async fn cancel_session(&self, id: Uuid, refund: i64) -> Result<MentorshipSession>;
    /// scheduled -> completed, rewarding the mentor in the same
    /// transaction. Returns the session and the mentor's new balance.
    async fn complete_session(&self, id: Uuid, reward: i64) -> Result<(MentorshipSession, i64)>;
    async fn sessions_for_mentor(&self, mentor_id: Uuid) -> Result<Vec<SessionWithParties>>;
    async fn sessions_for_mentee(&self, mentee_id: Uuid) -> Result<Vec<SessionWithParties>>;
}
