//! User and profile database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of `users`. The password hash is read separately.
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProfileModel {
    pub user_id: i64,
    pub name: String,
    pub avatar: Option<String>,
    pub daily_screen_time_goal: Option<i32>,
    pub total_screen_time: f64,
    pub focus_mode: bool,
    pub updated_at: DateTime<Utc>,
}
