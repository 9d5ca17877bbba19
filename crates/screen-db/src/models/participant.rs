//! Competition participant database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ParticipantModel {
    pub id: i64,
    pub competition_id: i64,
    pub user_id: i64,
    pub joined_at: DateTime<Utc>,
    pub position: Option<i32>,
    pub average_daily_usage: Option<f64>,
}
