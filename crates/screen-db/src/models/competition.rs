//! Competition database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct CompetitionModel {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub creator_id: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub cancelled: bool,
    pub created_at: DateTime<Utc>,
}
