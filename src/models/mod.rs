pub mod user;
pub mod post;
pub mod comment;
pub mod vote;
pub mod follow;
pub mod listing;
pub mod mentorship;

// Re-export models for convenience
pub use user::User;
pub use post::{Post, PostWithAuthor};
pub use comment::{Comment, CommentWithAuthor};
pub use vote::{Vote, VoteType, VoteTally};
pub use follow::Follow;
pub use listing::{Listing, ListingKind, ListingStatus, ListingWithOrg, Organization};
pub use mentorship::{MentorshipSession, SessionStatus, SessionWithParties};
