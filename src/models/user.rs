use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub school: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub mentorship_availability: bool,
    pub credits: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Display name falling back to the username when no name is set.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.username)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub school: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
}

/// Public view of a user, without the password hash or credit balance.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub school: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub mentorship_availability: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            email: user.email,
            name: user.name,
            bio: user.bio,
            profile_picture: user.profile_picture,
            school: user.school,
            company: user.company,
            role: user.role,
            mentorship_availability: user.mentorship_availability,
            created_at: user.created_at,
        }
    }
}

/// Own-profile view: adds the credit balance and follow list.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub credits: i64,
    pub followings: Vec<String>,
}

/// Compact entry for the available-mentors list.
#[derive(Debug, Serialize)]
pub struct MentorSummary {
    pub user_id: Uuid,
    pub name: String,
    pub bio: Option<String>,
}

impl From<User> for MentorSummary {
    fn from(user: User) -> Self {
        let name = user.display_name().to_string();
        Self {
            user_id: user.user_id,
            name,
            bio: user.bio,
        }
    }
}
