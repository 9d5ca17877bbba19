//! Competition membership

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Links a user to a competition, carrying the usage metric and rank.
///
/// `position` is unique within a competition; ranked participants hold `1..=k`
/// and participants without an average follow at `k+1..`.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub id: Snowflake,
    pub competition_id: Snowflake,
    pub user_id: Snowflake,
    pub joined_at: DateTime<Utc>,
    pub position: Option<i32>,
    /// Rolling average of daily usage in minutes
    pub average_daily_usage: Option<f64>,
}

impl Participant {
    pub fn new(id: Snowflake, competition_id: Snowflake, user_id: Snowflake) -> Self {
        Self {
            id,
            competition_id,
            user_id,
            joined_at: Utc::now(),
            position: None,
            average_daily_usage: None,
        }
    }

    #[inline]
    pub fn is_ranked(&self) -> bool {
        self.average_daily_usage.is_some()
    }
}
