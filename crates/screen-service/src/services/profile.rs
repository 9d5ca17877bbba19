//! Profile service
//!
//! Reads and updates the caller's profile and deletes accounts.

use screen_core::{DomainError, Profile, ProfileUpdate, Snowflake, User};
use tracing::{info, instrument};

use crate::dto::{ProfileResponse, UpdateProfileRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;

pub struct ProfileService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ProfileService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    async fn load(&self, user_id: Snowflake) -> ServiceResult<(User, Profile)> {
        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;
        let profile = self
            .ctx
            .profile_repo()
            .find_by_user(user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;
        Ok((user, profile))
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: Snowflake) -> ServiceResult<ProfileResponse> {
        let (user, profile) = self.load(user_id).await?;
        Ok(ProfileResponse::new(&user, &profile))
    }

    /// Apply a partial update. A username change goes to the account row.
    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        user_id: Snowflake,
        request: UpdateProfileRequest,
    ) -> ServiceResult<ProfileResponse> {
        let (mut user, mut profile) = self.load(user_id).await?;

        if let Some(username) = request.username.as_deref().map(str::trim) {
            if username != user.username {
                User::validate_username(username)?;
                if self.ctx.user_repo().username_exists(username).await? {
                    return Err(DomainError::UsernameAlreadyExists.into());
                }
                self.ctx
                    .user_repo()
                    .update_username(user_id, username)
                    .await?;
                user.username = username.to_string();
            }
        }

        let update = ProfileUpdate {
            name: request.name.map(|n| n.trim().to_string()),
            avatar: request.avatar,
            daily_screen_time_goal: request.daily_screen_time_goal,
            focus_mode: request.focus_mode,
        };
        if profile.apply(&update) {
            self.ctx.profile_repo().update(&profile).await?;
        }

        info!(user_id = %user_id, "Profile updated");
        Ok(ProfileResponse::new(&user, &profile))
    }

    /// Delete the account; storage cascades to everything that references it
    #[instrument(skip(self))]
    pub async fn delete_account(&self, user_id: Snowflake) -> ServiceResult<()> {
        self.ctx.user_repo().delete(user_id).await?;
        info!(user_id = %user_id, "Account deleted");
        Ok(())
    }
}
