//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Operations documented as atomic must apply all
//! of their writes or none of them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    Competition, CompetitionInvitation, FriendRequest, Participant, Profile, User,
};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Batch lookup; missing ids are skipped
    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<User>>;

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    async fn username_exists(&self, username: &str) -> RepoResult<bool>;

    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    /// Atomically create the account and its profile
    async fn create(&self, user: &User, profile: &Profile, password_hash: &str) -> RepoResult<()>;

    /// Fails with `UsernameAlreadyExists` if another account holds the name
    async fn update_username(&self, id: Snowflake, username: &str) -> RepoResult<()>;

    /// Delete the account together with everything that references it
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>>;
}

// ============================================================================
// Profile Repository
// ============================================================================

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Option<Profile>>;

    async fn update(&self, profile: &Profile) -> RepoResult<()>;

    /// Add minutes to the cumulative usage counter
    async fn add_screen_time(&self, user_id: Snowflake, minutes: f64) -> RepoResult<()>;
}

// ============================================================================
// Friendship Repository
// ============================================================================

/// What `FriendshipRepository::send_request` did with a new request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestDelivery {
    /// Stored as pending
    Created,
    /// The receiver's pending request was accepted instead
    AcceptedReverse(FriendRequest),
}

#[async_trait]
pub trait FriendshipRepository: Send + Sync {
    async fn find_request(&self, id: Snowflake) -> RepoResult<Option<FriendRequest>>;

    /// Deliver a request, serialized per unordered pair of users.
    ///
    /// Fails with `AlreadyFriends` or `FriendRequestAlreadySent`. A pending
    /// request in the other direction is accepted instead of storing this one.
    async fn send_request(&self, request: &FriendRequest) -> RepoResult<RequestDelivery>;

    async fn list_sent(&self, user_id: Snowflake) -> RepoResult<Vec<FriendRequest>>;

    async fn list_received(&self, user_id: Snowflake) -> RepoResult<Vec<FriendRequest>>;

    /// Atomically add both friend links and delete the request
    async fn accept_request(&self, request_id: Snowflake) -> RepoResult<()>;

    /// Delete the request without linking the users
    async fn reject_request(&self, request_id: Snowflake) -> RepoResult<()>;

    async fn are_friends(&self, user_id: Snowflake, other_id: Snowflake) -> RepoResult<bool>;

    /// Friends of a user, ordered by username
    async fn list_friends(&self, user_id: Snowflake) -> RepoResult<Vec<User>>;

    /// Atomically drop both friend links. Returns false if neither existed.
    async fn remove_friendship(&self, user_id: Snowflake, other_id: Snowflake)
        -> RepoResult<bool>;
}

// ============================================================================
// Competition Repository
// ============================================================================

#[async_trait]
pub trait CompetitionRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Competition>>;

    /// Atomically insert the competition and its creator's membership
    async fn create(&self, competition: &Competition, creator: &Participant) -> RepoResult<()>;

    /// Competitions the user participates in, newest first
    async fn list_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Competition>>;

    /// Competitions the user participates in whose window contains `at`.
    /// The cancellation flag is not consulted.
    async fn list_running_for_user(
        &self,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<Vec<Competition>>;

    async fn set_cancelled(&self, id: Snowflake, cancelled: bool) -> RepoResult<()>;

    async fn participant_count(&self, id: Snowflake) -> RepoResult<i64>;
}

// ============================================================================
// Participant Repository
// ============================================================================

/// Membership storage and the ranking critical section.
///
/// `record_usage`, `recalculate` and `remove` serialize per competition so that
/// positions stay dense and unique under concurrent updates.
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    async fn find(
        &self,
        competition_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<Participant>>;

    async fn list_by_competition(&self, competition_id: Snowflake)
        -> RepoResult<Vec<Participant>>;

    /// Delete a membership and compact the remaining positions.
    /// Fails with `ParticipantNotFound` if there was nothing to delete.
    async fn remove(&self, competition_id: Snowflake, user_id: Snowflake) -> RepoResult<()>;

    /// Fold `minutes` into the member's average and re-rank the competition
    async fn record_usage(
        &self,
        competition_id: Snowflake,
        user_id: Snowflake,
        minutes: f64,
    ) -> RepoResult<Participant>;

    /// Re-rank every participant of the competition
    async fn recalculate(&self, competition_id: Snowflake) -> RepoResult<Vec<Participant>>;
}

// ============================================================================
// Invitation Repository
// ============================================================================

#[async_trait]
pub trait InvitationRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<CompetitionInvitation>>;

    async fn has_pending(&self, competition_id: Snowflake, receiver_id: Snowflake)
        -> RepoResult<bool>;

    /// Fails with `AlreadyInvited` if a pending invitation already exists
    async fn create(&self, invitation: &CompetitionInvitation) -> RepoResult<()>;

    /// Pending invitations addressed to the user, newest first
    async fn list_pending_for_receiver(
        &self,
        receiver_id: Snowflake,
    ) -> RepoResult<Vec<CompetitionInvitation>>;

    /// Every invitation the user has sent, in any status, newest first
    async fn list_by_sender(&self, sender_id: Snowflake) -> RepoResult<Vec<CompetitionInvitation>>;

    /// Atomically mark the invitation accepted and insert `participant`.
    /// Fails with `InvitationNotPending` unless the invitation is pending and
    /// addressed to `receiver_id`.
    async fn accept(
        &self,
        invitation_id: Snowflake,
        receiver_id: Snowflake,
        participant: &Participant,
    ) -> RepoResult<CompetitionInvitation>;

    /// Same preconditions as `accept`
    async fn decline(
        &self,
        invitation_id: Snowflake,
        receiver_id: Snowflake,
    ) -> RepoResult<CompetitionInvitation>;

    /// Move a pending invitation to `expired`
    async fn expire(&self, invitation_id: Snowflake) -> RepoResult<()>;
}
