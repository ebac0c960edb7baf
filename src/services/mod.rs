pub mod user_service;
pub mod post_service;
pub mod vote_service;
pub mod listing_service;
pub mod mentorship_service;
pub mod mail_service;

pub use user_service::UserService;
pub use post_service::PostService;
pub use vote_service::VoteService;
pub use listing_service::ListingService;
pub use mentorship_service::MentorshipService;
pub use mail_service::MailService;
