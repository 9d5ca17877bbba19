//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake ids serialize as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use screen_core::{
    Competition, CompetitionStatus, FriendRequestStatus, InvitationStatus, Participant, Profile,
    Snowflake, User,
};
use serde::Serialize;

// ============================================================================
// Common Response Types
// ============================================================================

/// `{"success": "..."}`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SuccessResponse {
    pub success: String,
}

impl SuccessResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: message.into(),
        }
    }
}

/// `{"message": "..."}`
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub database: &'static str,
}

// ============================================================================
// User Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: Snowflake,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// Minimal user reference used inside friend requests
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Snowflake,
    pub username: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub username: String,
    pub name: String,
    pub avatar: Option<String>,
    pub daily_screen_time_goal: Option<i32>,
    pub total_screen_time: f64,
    pub focus_mode: bool,
    pub updated_at: DateTime<Utc>,
}

impl ProfileResponse {
    pub fn new(user: &User, profile: &Profile) -> Self {
        Self {
            user: UserResponse::from(user),
            username: user.username.clone(),
            name: profile.name.clone(),
            avatar: profile.avatar.clone(),
            daily_screen_time_goal: profile.daily_screen_time_goal,
            total_screen_time: profile.total_screen_time,
            focus_mode: profile.focus_mode,
            updated_at: profile.updated_at,
        }
    }
}

// ============================================================================
// Friendship Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SentRequestResponse {
    pub id: Snowflake,
    pub receiver: UserSummary,
    pub status: FriendRequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReceivedRequestResponse {
    pub id: Snowflake,
    pub sender: UserSummary,
    pub status: FriendRequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FriendRequestsResponse {
    pub sent_requests: Vec<SentRequestResponse>,
    pub received_requests: Vec<ReceivedRequestResponse>,
}

// ============================================================================
// Competition Responses
// ============================================================================

/// Competition as it appears in lists and inside invitations
#[derive(Debug, Clone, Serialize)]
pub struct CompetitionSummaryResponse {
    pub id: Snowflake,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: CompetitionStatus,
    pub creator: UserResponse,
    pub participant_count: i64,
    pub created_at: DateTime<Utc>,
    pub is_creator: bool,
}

impl CompetitionSummaryResponse {
    pub fn new(
        competition: &Competition,
        status: CompetitionStatus,
        creator: &User,
        participant_count: i64,
        viewer_id: Snowflake,
    ) -> Self {
        Self {
            id: competition.id,
            title: competition.title.clone(),
            description: competition.description.clone(),
            start_date: competition.start_date,
            end_date: competition.end_date,
            status,
            creator: UserResponse::from(creator),
            participant_count,
            created_at: competition.created_at,
            is_creator: competition.is_creator(viewer_id),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipantResponse {
    pub id: Snowflake,
    pub user: UserResponse,
    pub joined_at: DateTime<Utc>,
    pub position: Option<i32>,
    pub average_daily_usage: Option<f64>,
}

impl ParticipantResponse {
    pub fn new(participant: &Participant, user: &User) -> Self {
        Self {
            id: participant.id,
            user: UserResponse::from(user),
            joined_at: participant.joined_at,
            position: participant.position,
            average_daily_usage: participant.average_daily_usage,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LeaderboardResponse {
    pub ranked: Vec<ParticipantResponse>,
    pub unranked: Vec<ParticipantResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompetitionDetailResponse {
    pub id: Snowflake,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: CompetitionStatus,
    pub creator: UserResponse,
    /// Rank-1 participant once the competition has completed
    pub winner: Option<UserResponse>,
    /// Ranked by position, then unranked by id
    pub participants: Vec<ParticipantResponse>,
    pub leaderboard: LeaderboardResponse,
    pub total_participants: usize,
    pub created_at: DateTime<Utc>,
    pub is_creator: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvitationResponse {
    pub id: Snowflake,
    pub competition: CompetitionSummaryResponse,
    pub sender: UserResponse,
    pub receiver: UserResponse,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvitationHandledResponse {
    pub success: String,
    pub invitation: InvitationResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScreenTimeUpdateResponse {
    pub updated_competitions: Vec<CompetitionSummaryResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_response_serializes_string_id() {
        let user = User::new(Snowflake::new(77), "alice".into(), "alice@example.com".into());
        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();
        assert_eq!(json["id"], "77");
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn test_summary_status_is_lowercase() {
        let now = Utc::now();
        let creator = User::new(Snowflake::new(1), "c".into(), "c@example.com".into());
        let competition = Competition::new(
            Snowflake::new(9),
            "Detox".into(),
            String::new(),
            creator.id,
            now - chrono::Duration::days(1),
            now + chrono::Duration::days(7),
        )
        .unwrap();

        let summary = CompetitionSummaryResponse::new(
            &competition,
            competition.status_at(now),
            &creator,
            1,
            creator.id,
        );
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["is_creator"], true);
        assert_eq!(json["creator"]["email"], "c@example.com");
    }
}
