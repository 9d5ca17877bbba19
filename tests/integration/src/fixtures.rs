//! Request and response shapes plus unique test data

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

static COUNTER: AtomicU64 = AtomicU64::new(1);
static RUN_TAG: OnceLock<String> = OnceLock::new();

/// Suffix unique within this run and, via the run tag, across runs
pub fn unique_suffix() -> String {
    let tag = RUN_TAG.get_or_init(|| uuid::Uuid::new_v4().simple().to_string()[..8].to_string());
    format!("{tag}{}", COUNTER.fetch_add(1, Ordering::SeqCst))
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignupRequest {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            username: format!("u{suffix}"),
            email: format!("u{suffix}@example.com"),
            password: "TestPass123!".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_signup(signup: &SignupRequest) -> Self {
        Self {
            username: signup.username.clone(),
            password: signup.password.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// Signed-up account with its bearer token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub token: String,
    pub id: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct CreateCompetitionRequest {
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl CreateCompetitionRequest {
    /// Started an hour ago, ends in a week
    pub fn running() -> Self {
        let now = Utc::now();
        Self {
            title: format!("Detox {}", unique_suffix()),
            description: "Less scrolling".to_string(),
            start_date: now - Duration::hours(1),
            end_date: now + Duration::days(7),
        }
    }

    pub fn upcoming() -> Self {
        let now = Utc::now();
        Self {
            start_date: now + Duration::days(1),
            end_date: now + Duration::days(8),
            ..Self::running()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CompetitionSummary {
    pub id: String,
    pub title: String,
    pub status: String,
    pub participant_count: i64,
    pub is_creator: bool,
}

#[derive(Debug, Deserialize)]
pub struct ParticipantEntry {
    pub user: UserResponse,
    pub position: Option<i32>,
    pub average_daily_usage: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct Leaderboard {
    pub ranked: Vec<ParticipantEntry>,
    pub unranked: Vec<ParticipantEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CompetitionDetail {
    pub id: String,
    pub title: String,
    pub status: String,
    pub creator: UserResponse,
    pub participants: Vec<ParticipantEntry>,
    pub leaderboard: Leaderboard,
    pub total_participants: usize,
    pub is_creator: bool,
}

#[derive(Debug, Deserialize)]
pub struct InvitationEntry {
    pub id: String,
    pub competition: CompetitionSummary,
    pub sender: UserResponse,
    pub receiver: UserResponse,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct InvitationHandled {
    pub success: String,
    pub invitation: InvitationEntry,
}

#[derive(Debug, Deserialize)]
pub struct SuccessBody {
    pub success: String,
}

#[derive(Debug, Deserialize)]
pub struct FriendRequestEntry {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct FriendRequests {
    pub sent_requests: Vec<FriendRequestEntry>,
    pub received_requests: Vec<FriendRequestEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ScreenTimeUpdate {
    pub updated_competitions: Vec<CompetitionSummary>,
}
