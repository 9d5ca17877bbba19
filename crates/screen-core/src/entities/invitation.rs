//! Competition invitations

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Creator-issued offer for a friend to join a competition.
/// At most one pending invitation exists per (competition, receiver).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetitionInvitation {
    pub id: Snowflake,
    pub competition_id: Snowflake,
    pub sender_id: Snowflake,
    pub receiver_id: Snowflake,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompetitionInvitation {
    pub fn new(
        id: Snowflake,
        competition_id: Snowflake,
        sender_id: Snowflake,
        receiver_id: Snowflake,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            competition_id,
            sender_id,
            receiver_id,
            status: InvitationStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Expired => "expired",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "declined" => Some(Self::Declined),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationAction {
    Accept,
    Decline,
}

impl InvitationAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "accept" => Some(Self::Accept),
            "decline" => Some(Self::Decline),
            _ => None,
        }
    }

    /// Status an invitation ends up in after this action
    pub fn resulting_status(&self) -> InvitationStatus {
        match self {
            Self::Accept => InvitationStatus::Accepted,
            Self::Decline => InvitationStatus::Declined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_maps_to_status() {
        assert_eq!(
            InvitationAction::parse("ACCEPT").map(|a| a.resulting_status()),
            Some(InvitationStatus::Accepted)
        );
        assert_eq!(
            InvitationAction::parse("decline").map(|a| a.resulting_status()),
            Some(InvitationStatus::Declined)
        );
        assert_eq!(InvitationAction::parse("reject"), None);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(InvitationStatus::parse("expired"), Some(InvitationStatus::Expired));
        assert_eq!(InvitationStatus::parse("unknown"), None);
    }
}
