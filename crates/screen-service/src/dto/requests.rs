//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate`. Fields whose absence
//! has its own client message are `Option` so the service can report it.

use chrono::{DateTime, NaiveDate, Utc};
use screen_core::Snowflake;
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Auth Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 20, message = "Username must be 1-20 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    /// Display name; defaults to the username
    #[validate(length(max = 40, message = "Name must be at most 40 characters"))]
    pub name: Option<String>,
}

/// Login by username or email address
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(alias = "email")]
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    pub password: String,
}

// ============================================================================
// Profile Requests
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 20, message = "Username must be 1-20 characters"))]
    pub username: Option<String>,

    #[validate(length(max = 40, message = "Name must be at most 40 characters"))]
    pub name: Option<String>,

    /// Reference to an already-stored avatar image
    #[validate(length(max = 500, message = "Avatar must be at most 500 characters"))]
    pub avatar: Option<String>,

    #[validate(range(min = 0, max = 1440, message = "Daily goal must be between 0 and 1440 minutes"))]
    pub daily_screen_time_goal: Option<i32>,

    pub focus_mode: Option<bool>,
}

// ============================================================================
// Friendship Requests
// ============================================================================

/// Target user by `username` or `user_id`; username wins when both are set
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SendFriendRequestRequest {
    pub username: Option<String>,
    pub user_id: Option<Snowflake>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct HandleFriendRequestRequest {
    pub request_id: Option<Snowflake>,
    pub action: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DeleteFriendRequest {
    pub friend_id: Option<Snowflake>,
}

// ============================================================================
// Competition Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCompetitionRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: String,

    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SendInvitationRequest {
    pub competition_id: Option<Snowflake>,

    /// Receiver's username
    #[serde(alias = "receiver_username")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct HandleInvitationRequest {
    pub invitation_id: Option<Snowflake>,
    pub action: Option<String>,
}

// ============================================================================
// Ranking Requests
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateScreenTimeRequest {
    pub screen_time_minutes: Option<f64>,

    /// Day the usage belongs to; defaults to today (UTC)
    pub date: Option<NaiveDate>,
}
