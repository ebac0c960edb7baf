#![allow(dead_code)]

// In-memory repository implementations used to drive the services without
// PostgreSQL. Each mock mirrors the contract documented on its trait.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use finlit_marketplace::db::repository::{
    CommentRepository, FollowRepository, ListingRepository, MentorshipRepository,
    OrganizationRepository, PostRepository, UserRepository, VoteRepository,
};
use finlit_marketplace::db::DatabaseClient;
use finlit_marketplace::models::listing::ListingFilter;
use finlit_marketplace::models::post::PostWithVotes;
use finlit_marketplace::models::{
    Comment, CommentWithAuthor, Follow, Listing, ListingKind, ListingStatus, ListingWithOrg,
    MentorshipSession, Organization, Post, PostWithAuthor, SessionStatus, SessionWithParties,
    User, Vote, VoteTally, VoteType,
};
use finlit_marketplace::{AppConfig, AppError, AppState, CreditPolicy, Result};

#[derive(Default)]
pub struct MemoryStore {
    pub users: Mutex<HashMap<Uuid, User>>,
    pub follows: Mutex<Vec<Follow>>,
    pub posts: Mutex<HashMap<Uuid, Post>>,
    pub comments: Mutex<Vec<Comment>>,
    pub votes: Mutex<Vec<Vote>>,
    pub organizations: Mutex<HashMap<Uuid, Organization>>,
    pub listings: Mutex<HashMap<Uuid, Listing>>,
    pub sessions: Mutex<HashMap<Uuid, MentorshipSession>>,
}

impl MemoryStore {
    fn author_of(&self, user_id: Uuid) -> Result<(String, Option<String>)> {
        let users = self.users.lock().unwrap();
        let user = users
            .get(&user_id)
            .ok_or_else(|| AppError::DatabaseError("Author not found".to_string()))?;
        Ok((user.username.clone(), user.name.clone()))
    }

    fn with_author(&self, post: &Post) -> Result<PostWithAuthor> {
        let (author_username, author_name) = self.author_of(post.user_id)?;
        Ok(PostWithAuthor {
            post_id: post.post_id,
            user_id: post.user_id,
            title: post.title.clone(),
            content: post.content.clone(),
            image_url: post.image_url.clone(),
            created_at: post.created_at,
            updated_at: post.updated_at,
            author_username,
            author_name,
        })
    }

    fn with_org(&self, listing: &Listing) -> ListingWithOrg {
        let organization_name = listing.organization_id.and_then(|id| {
            self.organizations
                .lock()
                .unwrap()
                .get(&id)
                .map(|o| o.name.clone())
        });
        ListingWithOrg {
            listing: listing.clone(),
            organization_name,
        }
    }

    fn with_parties(&self, session: &MentorshipSession) -> Result<SessionWithParties> {
        let users = self.users.lock().unwrap();
        let mentor = users
            .get(&session.mentor_id)
            .ok_or_else(|| AppError::DatabaseError("Mentor not found".to_string()))?;
        let mentee = users
            .get(&session.mentee_id)
            .ok_or_else(|| AppError::DatabaseError("Mentee not found".to_string()))?;
        Ok(SessionWithParties {
            session: session.clone(),
            mentor_name: mentor.display_name().to_string(),
            mentor_email: mentor.email.clone(),
            mentee_name: mentee.display_name().to_string(),
            mentee_email: mentee.email.clone(),
        })
    }
}

pub struct MemoryUserRepository(pub Arc<MemoryStore>);

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create_user(&self, user: &User) -> Result<User> {
        let mut users = self.0.users.lock().unwrap();
        users.insert(user.user_id, user.clone());
        Ok(user.clone())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.0.users.lock().unwrap().get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn update_profile(&self, user: &User) -> Result<User> {
        let mut users = self.0.users.lock().unwrap();
        let stored = users
            .get_mut(&user.user_id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        stored.name = user.name.clone();
        stored.bio = user.bio.clone();
        stored.profile_picture = user.profile_picture.clone();
        stored.school = user.school.clone();
        stored.company = user.company.clone();
        stored.role = user.role.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn set_mentorship_availability(&self, id: Uuid, available: bool) -> Result<()> {
        let mut users = self.0.users.lock().unwrap();
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        user.mentorship_availability = available;
        Ok(())
    }

    async fn get_available_mentors(&self, exclude: Uuid) -> Result<Vec<User>> {
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .values()
            .filter(|u| u.mentorship_availability && u.user_id != exclude)
            .cloned()
            .collect())
    }

    async fn get_credits(&self, id: Uuid) -> Result<i64> {
        self.0
            .users
            .lock()
            .unwrap()
            .get(&id)
            .map(|u| u.credits)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn charge_credits(&self, id: Uuid, amount: i64) -> Result<i64> {
        let mut users = self.0.users.lock().unwrap();
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        if user.credits < amount {
            return Err(AppError::Forbidden("Insufficient credits".to_string()));
        }
        user.credits -= amount;
        Ok(user.credits)
    }

    async fn add_credits(&self, id: Uuid, amount: i64) -> Result<i64> {
        let mut users = self.0.users.lock().unwrap();
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        user.credits += amount;
        Ok(user.credits)
    }
}

pub struct MemoryFollowRepository(pub Arc<MemoryStore>);

#[async_trait]
impl FollowRepository for MemoryFollowRepository {
    async fn follow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<Follow> {
        let follow = Follow {
            follow_id: Uuid::new_v4(),
            follower_id,
            followed_id,
            created_at: Utc::now(),
        };
        self.0.follows.lock().unwrap().push(follow.clone());
        Ok(follow)
    }

    async fn unfollow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool> {
        let mut follows = self.0.follows.lock().unwrap();
        let before = follows.len();
        follows.retain(|f| !(f.follower_id == follower_id && f.followed_id == followed_id));
        Ok(follows.len() < before)
    }

    async fn is_following(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool> {
        Ok(self
            .0
            .follows
            .lock()
            .unwrap()
            .iter()
            .any(|f| f.follower_id == follower_id && f.followed_id == followed_id))
    }

    async fn followed_users(&self, follower_id: Uuid) -> Result<Vec<User>> {
        let followed_ids: Vec<Uuid> = self
            .0
            .follows
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.follower_id == follower_id)
            .map(|f| f.followed_id)
            .collect();

        let users = self.0.users.lock().unwrap();
        Ok(followed_ids
            .iter()
            .filter_map(|id| users.get(id).cloned())
            .collect())
    }
}

pub struct MemoryPostRepository(pub Arc<MemoryStore>);

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn create_post(&self, post: &Post, author_reward: i64) -> Result<(Post, i64)> {
        let credits = {
            let mut users = self.0.users.lock().unwrap();
            let author = users
                .get_mut(&post.user_id)
                .ok_or_else(|| AppError::DatabaseError("Author not found".to_string()))?;
            author.credits += author_reward;
            author.credits
        };
        self.0.posts.lock().unwrap().insert(post.post_id, post.clone());
        Ok((post.clone(), credits))
    }

    async fn get_post_by_id(&self, id: Uuid) -> Result<Option<PostWithAuthor>> {
        let post = self.0.posts.lock().unwrap().get(&id).cloned();
        post.map(|p| self.0.with_author(&p)).transpose()
    }

    async fn list_posts(&self) -> Result<Vec<PostWithAuthor>> {
        let mut posts: Vec<Post> = self.0.posts.lock().unwrap().values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts.iter().map(|p| self.0.with_author(p)).collect()
    }

    async fn list_posts_by_votes(&self) -> Result<Vec<PostWithVotes>> {
        let posts: Vec<Post> = self.0.posts.lock().unwrap().values().cloned().collect();
        let votes = self.0.votes.lock().unwrap();

        let mut rows = Vec::new();
        for post in &posts {
            let vote_count = votes.iter().filter(|v| v.post_id == post.post_id).count() as i64;
            let (author_username, author_name) = self.0.author_of(post.user_id)?;
            rows.push(PostWithVotes {
                post_id: post.post_id,
                user_id: post.user_id,
                title: post.title.clone(),
                content: post.content.clone(),
                image_url: post.image_url.clone(),
                created_at: post.created_at,
                updated_at: post.updated_at,
                author_username,
                author_name,
                vote_count,
            });
        }
        rows.sort_by(|a, b| {
            b.vote_count
                .cmp(&a.vote_count)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(rows)
    }

    async fn list_posts_by_user(&self, user_id: Uuid) -> Result<Vec<PostWithAuthor>> {
        let mut posts: Vec<Post> = self
            .0
            .posts
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts.iter().map(|p| self.0.with_author(p)).collect()
    }

    async fn list_posts_by_followed(&self, follower_id: Uuid) -> Result<Vec<PostWithAuthor>> {
        let followed: Vec<Uuid> = self
            .0
            .follows
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.follower_id == follower_id)
            .map(|f| f.followed_id)
            .collect();

        let mut posts: Vec<Post> = self
            .0
            .posts
            .lock()
            .unwrap()
            .values()
            .filter(|p| followed.contains(&p.user_id))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts.iter().map(|p| self.0.with_author(p)).collect()
    }

    async fn delete_post(&self, id: Uuid) -> Result<()> {
        self.0.posts.lock().unwrap().remove(&id);
        self.0.comments.lock().unwrap().retain(|c| c.post_id != id);
        self.0.votes.lock().unwrap().retain(|v| v.post_id != id);
        Ok(())
    }
}

pub struct MemoryCommentRepository(pub Arc<MemoryStore>);

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn create_comment(&self, comment: &Comment) -> Result<Comment> {
        self.0.comments.lock().unwrap().push(comment.clone());
        Ok(comment.clone())
    }

    async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        let comments: Vec<Comment> = self
            .0
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();

        let mut rows = Vec::new();
        for comment in comments {
            let (author_username, author_name) = self.0.author_of(comment.user_id)?;
            rows.push(CommentWithAuthor {
                comment_id: comment.comment_id,
                post_id: comment.post_id,
                user_id: comment.user_id,
                comment_text: comment.comment_text,
                created_at: comment.created_at,
                updated_at: comment.updated_at,
                author_username,
                author_name,
            });
        }
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }
}

pub struct MemoryVoteRepository(pub Arc<MemoryStore>);

#[async_trait]
impl VoteRepository for MemoryVoteRepository {
    async fn get_user_vote(&self, post_id: Uuid, user_id: Uuid) -> Result<Option<Vote>> {
        Ok(self
            .0
            .votes
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.post_id == post_id && v.user_id == user_id)
            .cloned())
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<Vote> {
        self.0.votes.lock().unwrap().push(vote.clone());
        Ok(vote.clone())
    }

    async fn update_vote_type(&self, vote_id: Uuid, vote_type: VoteType) -> Result<()> {
        let mut votes = self.0.votes.lock().unwrap();
        if let Some(vote) = votes.iter_mut().find(|v| v.vote_id == vote_id) {
            vote.vote_type = vote_type;
        }
        Ok(())
    }

    async fn delete_vote(&self, post_id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut votes = self.0.votes.lock().unwrap();
        let before = votes.len();
        votes.retain(|v| !(v.post_id == post_id && v.user_id == user_id));
        Ok(votes.len() < before)
    }

    async fn tally(&self, post_id: Uuid) -> Result<VoteTally> {
        let votes = self.0.votes.lock().unwrap();
        let upvotes = votes
            .iter()
            .filter(|v| v.post_id == post_id && v.vote_type == VoteType::Upvote)
            .count() as i64;
        let downvotes = votes
            .iter()
            .filter(|v| v.post_id == post_id && v.vote_type == VoteType::Downvote)
            .count() as i64;
        Ok(VoteTally { upvotes, downvotes })
    }
}

pub struct MemoryOrganizationRepository(pub Arc<MemoryStore>);

#[async_trait]
impl OrganizationRepository for MemoryOrganizationRepository {
    async fn find_or_create(&self, name: &str) -> Result<Organization> {
        let mut organizations = self.0.organizations.lock().unwrap();
        if let Some(existing) = organizations.values().find(|o| o.name == name) {
            return Ok(existing.clone());
        }
        let organization = Organization {
            organization_id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            website: None,
            created_at: Utc::now(),
        };
        organizations.insert(organization.organization_id, organization.clone());
        Ok(organization)
    }
}

pub struct MemoryListingRepository(pub Arc<MemoryStore>);

#[async_trait]
impl ListingRepository for MemoryListingRepository {
    async fn create_listing(&self, listing: &Listing, author_reward: i64) -> Result<(Listing, i64)> {
        let credits = {
            let mut users = self.0.users.lock().unwrap();
            let author = users
                .get_mut(&listing.user_id)
                .ok_or_else(|| AppError::DatabaseError("Author not found".to_string()))?;
            author.credits += author_reward;
            author.credits
        };
        self.0
            .listings
            .lock()
            .unwrap()
            .insert(listing.listing_id, listing.clone());
        Ok((listing.clone(), credits))
    }

    async fn get_listing(&self, kind: ListingKind, id: Uuid) -> Result<Option<ListingWithOrg>> {
        Ok(self
            .0
            .listings
            .lock()
            .unwrap()
            .get(&id)
            .filter(|l| l.kind == kind)
            .map(|l| self.0.with_org(l)))
    }

    async fn list_listings(&self, kind: ListingKind) -> Result<Vec<ListingWithOrg>> {
        let mut listings: Vec<Listing> = self
            .0
            .listings
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.kind == kind && l.status != ListingStatus::Closed)
            .cloned()
            .collect();
        listings.sort_by(|a, b| a.deadline.cmp(&b.deadline));
        Ok(listings.iter().map(|l| self.0.with_org(l)).collect())
    }

    async fn filter_listings(
        &self,
        kind: ListingKind,
        filter: &ListingFilter,
    ) -> Result<Vec<ListingWithOrg>> {
        let rows = self.list_listings(kind).await?;
        Ok(rows
            .into_iter()
            .filter(|row| {
                if let Some(title) = &filter.title {
                    if !row
                        .listing
                        .title
                        .to_lowercase()
                        .contains(&title.to_lowercase())
                    {
                        return false;
                    }
                }
                if let Some(organization) = &filter.organization {
                    match &row.organization_name {
                        Some(name)
                            if name.to_lowercase().contains(&organization.to_lowercase()) => {}
                        _ => return false,
                    }
                }
                if let Some(min_amount) = filter.min_amount {
                    if row.listing.amount.unwrap_or(0) < min_amount {
                        return false;
                    }
                }
                true
            })
            .collect())
    }

    async fn listings_by_user(
        &self,
        kind: ListingKind,
        user_id: Uuid,
    ) -> Result<Vec<ListingWithOrg>> {
        Ok(self
            .0
            .listings
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.kind == kind && l.user_id == user_id)
            .map(|l| self.0.with_org(l))
            .collect())
    }

    async fn update_listing(&self, listing: &Listing) -> Result<Listing> {
        let mut listings = self.0.listings.lock().unwrap();
        let stored = listings
            .get_mut(&listing.listing_id)
            .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;
        *stored = listing.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_listing(&self, id: Uuid) -> Result<()> {
        self.0.listings.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut listings = self.0.listings.lock().unwrap();
        let mut changed = 0;
        for listing in listings.values_mut() {
            if listing.status == ListingStatus::Active && listing.deadline < now {
                listing.status = ListingStatus::Expired;
                listing.updated_at = now;
                changed += 1;
            }
        }
        Ok(changed)
    }
}

pub struct MemoryMentorshipRepository(pub Arc<MemoryStore>);

#[async_trait]
impl MentorshipRepository for MemoryMentorshipRepository {
    async fn book_session(
        &self,
        session: &MentorshipSession,
        cost: i64,
    ) -> Result<(MentorshipSession, i64)> {
        let credits = {
            let mut users = self.0.users.lock().unwrap();
            let mentee = users
                .get_mut(&session.mentee_id)
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            if mentee.credits < cost {
                return Err(AppError::Forbidden("Insufficient credits".to_string()));
            }
            mentee.credits -= cost;
            mentee.credits
        };
        self.0
            .sessions
            .lock()
            .unwrap()
            .insert(session.session_id, session.clone());
        Ok((session.clone(), credits))
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<MentorshipSession>> {
        Ok(self.0.sessions.lock().unwrap().get(&id).cloned())
    }

    async fn approve_session(&self, id: Uuid) -> Result<MentorshipSession> {
        let mut sessions = self.0.sessions.lock().unwrap();
        let session = sessions
            .get_mut(&id)
            .filter(|s| s.status == SessionStatus::Pending)
            .ok_or_else(|| {
                AppError::ValidationError("Only pending sessions can be approved".to_string())
            })?;
        session.status = SessionStatus::Scheduled;
        session.updated_at = Utc::now();
        Ok(session.clone())
    }

    async fn cancel_session(&self, id: Uuid, refund: i64) -> Result<MentorshipSession> {
        let canceled = {
            let mut sessions = self.0.sessions.lock().unwrap();
            let session = sessions
                .get_mut(&id)
                .filter(|s| s.status == SessionStatus::Pending)
                .ok_or_else(|| {
                    AppError::ValidationError("Only pending sessions can be canceled".to_string())
                })?;
            session.status = SessionStatus::Canceled;
            session.updated_at = Utc::now();
            session.clone()
        };

        let mut users = self.0.users.lock().unwrap();
        if let Some(mentee) = users.get_mut(&canceled.mentee_id) {
            mentee.credits += refund;
        }
        Ok(canceled)
    }

    async fn complete_session(&self, id: Uuid, reward: i64) -> Result<(MentorshipSession, i64)> {
        let completed = {
            let mut sessions = self.0.sessions.lock().unwrap();
            let session = sessions
                .get_mut(&id)
                .filter(|s| s.status == SessionStatus::Scheduled)
                .ok_or_else(|| {
                    AppError::ValidationError("Only scheduled sessions can be completed".to_string())
                })?;
            session.status = SessionStatus::Completed;
            session.updated_at = Utc::now();
            session.clone()
        };

        let mut users = self.0.users.lock().unwrap();
        let mentor = users
            .get_mut(&completed.mentor_id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        mentor.credits += reward;
        Ok((completed, mentor.credits))
    }

    async fn sessions_for_mentor(&self, mentor_id: Uuid) -> Result<Vec<SessionWithParties>> {
        let sessions: Vec<MentorshipSession> = self
            .0
            .sessions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.mentor_id == mentor_id)
            .cloned()
            .collect();
        sessions.iter().map(|s| self.0.with_parties(s)).collect()
    }

    async fn sessions_for_mentee(&self, mentee_id: Uuid) -> Result<Vec<SessionWithParties>> {
        let sessions: Vec<MentorshipSession> = self
            .0
            .sessions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.mentee_id == mentee_id)
            .cloned()
            .collect();
        sessions.iter().map(|s| self.0.with_parties(s)).collect()
    }
}

pub fn memory_database() -> (DatabaseClient, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let db = DatabaseClient {
        user_repo: Arc::new(MemoryUserRepository(store.clone())),
        follow_repo: Arc::new(MemoryFollowRepository(store.clone())),
        post_repo: Arc::new(MemoryPostRepository(store.clone())),
        comment_repo: Arc::new(MemoryCommentRepository(store.clone())),
        vote_repo: Arc::new(MemoryVoteRepository(store.clone())),
        organization_repo: Arc::new(MemoryOrganizationRepository(store.clone())),
        listing_repo: Arc::new(MemoryListingRepository(store.clone())),
        mentorship_repo: Arc::new(MemoryMentorshipRepository(store.clone())),
    };
    (db, store)
}

pub fn test_config() -> AppConfig {
    AppConfig {
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        database_url: String::new(),
        jwt_secret: "test-secret".to_string(),
        mail_relay_url: None,
        mail_sender: "noreply@test.example".to_string(),
        credits: CreditPolicy::default(),
        sweep_interval_secs: 3600,
    }
}

pub fn test_state() -> (AppState, Arc<MemoryStore>) {
    let (db, store) = memory_database();
    (AppState::with_database(test_config(), db), store)
}

/// Insert a user directly, skipping registration and password hashing.
pub fn seed_user(store: &MemoryStore, username: &str, credits: i64) -> User {
    let now = Utc::now();
    let user = User {
        user_id: Uuid::new_v4(),
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password_hash: "not-a-real-hash".to_string(),
        name: None,
        bio: None,
        profile_picture: None,
        school: None,
        company: None,
        role: None,
        mentorship_availability: false,
        credits,
        created_at: now,
        updated_at: now,
    };
    store.users.lock().unwrap().insert(user.user_id, user.clone());
    user
}

pub fn set_mentor(store: &MemoryStore, user_id: Uuid) {
    if let Some(user) = store.users.lock().unwrap().get_mut(&user_id) {
        user.mentorship_availability = true;
    }
}

pub fn user_credits(store: &MemoryStore, user_id: Uuid) -> i64 {
    store.users.lock().unwrap().get(&user_id).unwrap().credits
}
