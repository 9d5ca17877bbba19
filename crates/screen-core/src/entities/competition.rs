//! Competition entity and its wall-clock lifecycle

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Maximum title length in characters
pub const TITLE_MAX_LEN: usize = 100;

/// Time-boxed competition over the half-open window `[start_date, end_date)`.
///
/// Status is never stored: it is derived from the window on every read, with the
/// `cancelled` flag as the only persisted override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Competition {
    pub id: Snowflake,
    pub title: String,
    pub description: String,
    pub creator_id: Snowflake,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub cancelled: bool,
    pub created_at: DateTime<Utc>,
}

impl Competition {
    /// Build a competition, rejecting empty or reversed windows
    pub fn new(
        id: Snowflake,
        title: String,
        description: String,
        creator_id: Snowflake,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let title = title.trim().to_string();
        if title.is_empty() || title.chars().count() > TITLE_MAX_LEN {
            return Err(DomainError::ValidationError(format!(
                "Title must be between 1 and {TITLE_MAX_LEN} characters"
            )));
        }
        if start_date >= end_date {
            return Err(DomainError::InvalidDateRange);
        }
        Ok(Self {
            id,
            title,
            description,
            creator_id,
            start_date,
            end_date,
            cancelled: false,
            created_at: Utc::now(),
        })
    }

    #[inline]
    pub fn is_creator(&self, user_id: Snowflake) -> bool {
        self.creator_id == user_id
    }

    /// Whether `at` falls inside `[start_date, end_date)`, ignoring cancellation
    pub fn is_running_at(&self, at: DateTime<Utc>) -> bool {
        self.start_date <= at && at < self.end_date
    }

    pub fn status_at(&self, at: DateTime<Utc>) -> CompetitionStatus {
        if self.cancelled {
            CompetitionStatus::Cancelled
        } else if at < self.start_date {
            CompetitionStatus::Upcoming
        } else if at < self.end_date {
            CompetitionStatus::Active
        } else {
            CompetitionStatus::Completed
        }
    }

    pub fn status(&self) -> CompetitionStatus {
        self.status_at(Utc::now())
    }

    /// Not cancelled and not yet over
    pub fn is_future_at(&self, at: DateTime<Utc>) -> bool {
        !self.cancelled && self.end_date > at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetitionStatus {
    Upcoming,
    Active,
    Completed,
    Cancelled,
}

impl CompetitionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// No further transitions happen from here
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for CompetitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
