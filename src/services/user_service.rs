use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::AuthService;
use crate::db::repository::{FollowRepository, UserRepository};
use crate::models::user::{
    CreateUserRequest, ProfileResponse, UpdateProfileRequest, UserResponse,
};
use crate::models::User;
use crate::{AppError, Result};

pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    follow_repo: Arc<dyn FollowRepository>,
    initial_credits: i64,
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        follow_repo: Arc<dyn FollowRepository>,
        initial_credits: i64,
    ) -> Self {
        Self {
            user_repo,
            follow_repo,
            initial_credits,
        }
    }

    pub async fn register(
        &self,
        request: CreateUserRequest,
        auth_service: &AuthService,
    ) -> Result<UserResponse> {
        let username = request.username.trim();
        let email = request.email.trim();

        if username.is_empty() {
            return Err(AppError::ValidationError("Username is required".to_string()));
        }
        if email.is_empty() {
            return Err(AppError::ValidationError("Email is required".to_string()));
        }
        if !email.contains('@') {
            return Err(AppError::ValidationError("Email is not valid".to_string()));
        }
        if request.password.len() < 8 {
            return Err(AppError::ValidationError(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if self.user_repo.get_user_by_username(username).await?.is_some() {
            return Err(AppError::ValidationError(
                "User already exists with this username".to_string(),
            ));
        }
        if self.user_repo.get_user_by_email(email).await?.is_some() {
            return Err(AppError::ValidationError(
                "User already exists with this email".to_string(),
            ));
        }

        let password_hash = auth_service.hash_password(&request.password)?;
        let now = Utc::now();
        let user = User {
            user_id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            name: request.name,
            bio: request.bio,
            profile_picture: None,
            school: None,
            company: None,
            role: None,
            mentorship_availability: false,
            credits: self.initial_credits,
            created_at: now,
            updated_at: now,
        };

        let created = self.user_repo.create_user(&user).await?;
        Ok(UserResponse::from(created))
    }

    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        auth_service: &AuthService,
    ) -> Result<(UserResponse, String)> {
        let user = self
            .user_repo
            .get_user_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

        if !auth_service.verify_password(password, &user.password_hash)? {
            return Err(AppError::AuthError("Invalid email or password".to_string()));
        }

        let token = auth_service.generate_token(user.user_id, &user.username)?;
        Ok((UserResponse::from(user), token))
    }

    /// Own profile: public fields plus the credit balance and follow list.
    pub async fn own_profile(&self, user_id: Uuid) -> Result<ProfileResponse> {
        let user = self.require_user(user_id).await?;
        let followings = self.following_names(user_id).await?;
        let credits = user.credits;

        Ok(ProfileResponse {
            user: UserResponse::from(user),
            credits,
            followings,
        })
    }

    /// Another user's profile, without the credit balance.
    pub async fn public_profile(&self, user_id: Uuid) -> Result<(UserResponse, Vec<String>)> {
        let user = self.require_user(user_id).await?;
        let followings = self.following_names(user_id).await?;
        Ok((UserResponse::from(user), followings))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<UserResponse> {
        let mut user = self.require_user(user_id).await?;

        // Absent fields keep their current value.
        if let Some(name) = request.name {
            user.name = Some(name);
        }
        if let Some(bio) = request.bio {
            user.bio = Some(bio);
        }
        if let Some(picture) = request.profile_picture {
            user.profile_picture = Some(picture);
        }
        if let Some(school) = request.school {
            user.school = Some(school);
        }
        if let Some(company) = request.company {
            user.company = Some(company);
        }
        if let Some(role) = request.role {
            user.role = Some(role);
        }

        let updated = self.user_repo.update_profile(&user).await?;
        Ok(UserResponse::from(updated))
    }

    pub async fn follow(&self, follower_id: Uuid, target_id: Uuid) -> Result<UserResponse> {
        if follower_id == target_id {
            return Err(AppError::ValidationError("Cannot follow yourself".to_string()));
        }

        let target = self
            .user_repo
            .get_user_by_id(target_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Target user not found".to_string()))?;

        if self.follow_repo.is_following(follower_id, target_id).await? {
            return Err(AppError::ValidationError(
                "Already following this user".to_string(),
            ));
        }

        self.follow_repo.follow(follower_id, target_id).await?;
        Ok(UserResponse::from(target))
    }

    pub async fn unfollow(&self, follower_id: Uuid, target_id: Uuid) -> Result<UserResponse> {
        let target = self
            .user_repo
            .get_user_by_id(target_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Target user not found".to_string()))?;

        if !self.follow_repo.unfollow(follower_id, target_id).await? {
            return Err(AppError::ValidationError(
                "Not following this user".to_string(),
            ));
        }

        Ok(UserResponse::from(target))
    }

    pub async fn credits(&self, user_id: Uuid) -> Result<i64> {
        self.user_repo.get_credits(user_id).await
    }

    async fn require_user(&self, user_id: Uuid) -> Result<User> {
        self.user_repo
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn following_names(&self, user_id: Uuid) -> Result<Vec<String>> {
        let followed = self.follow_repo.followed_users(user_id).await?;
        Ok(followed
            .into_iter()
            .map(|u| u.display_name().to_string())
            .collect())
    }
}
