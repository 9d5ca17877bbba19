//! Authentication service
//!
//! Handles signup, login and bearer-token resolution.

use screen_common::auth::{hash_password, validate_password_strength, verify_password};
use screen_common::AppError;
use screen_core::{DomainError, Profile, Snowflake, User};
use tracing::{info, instrument, warn};

use crate::dto::{AuthResponse, LoginRequest, MessageResponse, SignupRequest, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a new account and its profile, then sign a token for it
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn signup(&self, request: SignupRequest) -> ServiceResult<AuthResponse> {
        User::validate_username(&request.username)?;
        validate_password_strength(&request.password)?;

        let email = request.email.trim().to_string();
        if self.ctx.user_repo().email_exists(&email).await? {
            return Err(DomainError::EmailAlreadyExists.into());
        }
        if self.ctx.user_repo().username_exists(&request.username).await? {
            return Err(DomainError::UsernameAlreadyExists.into());
        }

        let password_hash = hash_password(&request.password)?;

        let user = User::new(self.ctx.generate_id(), request.username, email);
        let name = request
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| user.username.clone());
        let profile = Profile::new(user.id, name);

        // The unique constraints still catch a concurrent signup with the same name
        self.ctx
            .user_repo()
            .create(&user, &profile, &password_hash)
            .await?;

        info!(user_id = %user.id, "User registered successfully");

        self.issue(&user)
    }

    /// Login with username or email address
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<AuthResponse> {
        let identifier = request.username.trim();
        let user = match self.ctx.user_repo().find_by_username(identifier).await? {
            Some(user) => Some(user),
            None if identifier.contains('@') => {
                self.ctx.user_repo().find_by_email(identifier).await?
            }
            None => None,
        };

        let Some(user) = user else {
            warn!("Login failed: user not found");
            return Err(AppError::InvalidCredentials.into());
        };

        let password_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user.id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %user.id, "Login failed: no password hash");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        if !verify_password(&request.password, &password_hash)? {
            warn!(user_id = %user.id, "Login failed: invalid password");
            return Err(AppError::InvalidCredentials.into());
        }

        info!(user_id = %user.id, "User logged in successfully");

        self.issue(&user)
    }

    /// Resolve a bearer token to a live account.
    ///
    /// A well-formed token for a deleted account is rejected like a bad one.
    #[instrument(skip(self, token))]
    pub async fn authenticate(&self, token: &str) -> ServiceResult<User> {
        let claims = self.ctx.jwt_service().validate(token)?;
        let user_id = claims.user_id()?;

        self.ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::App(AppError::InvalidToken))
    }

    /// Confirmation body for `GET /isauth`
    pub async fn is_authenticated(&self, user_id: Snowflake) -> ServiceResult<MessageResponse> {
        if self.ctx.user_repo().find_by_id(user_id).await?.is_none() {
            return Err(AppError::InvalidToken.into());
        }
        Ok(MessageResponse::new("The user is authenticated"))
    }

    fn issue(&self, user: &User) -> ServiceResult<AuthResponse> {
        let issued = self.ctx.jwt_service().issue(user.id)?;
        Ok(AuthResponse {
            token: issued.token,
            user: UserResponse::from(user),
        })
    }
}
