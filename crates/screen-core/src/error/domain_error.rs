//! Domain errors.
//!
//! The `Display` text of each variant is the message returned to API clients.

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found")]
    UserNotFound,

    #[error("Competition not found")]
    CompetitionNotFound,

    #[error("Friend request not found")]
    FriendRequestNotFound,

    #[error("Friendship not found")]
    FriendshipNotFound,

    #[error("Participant not found")]
    ParticipantNotFound,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("{0}")]
    ValidationError(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("End date must be after start date")]
    InvalidDateRange,

    #[error("Screen time must be a non-negative number")]
    InvalidScreenTime,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Only the creator of the competition can send invitations")]
    NotCompetitionCreator,

    #[error("Only the creator can cancel this competition")]
    CannotCancelCompetition,

    #[error("You don't have access to this competition")]
    NoCompetitionAccess,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Username already taken")]
    UsernameAlreadyExists,

    #[error("Friend request already sent")]
    FriendRequestAlreadySent,

    #[error("You are already friends with this user")]
    AlreadyFriends,

    #[error("User already invited")]
    AlreadyInvited,

    #[error("User already participating")]
    AlreadyParticipating,

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Cannot send friend request to yourself")]
    CannotFriendSelf,

    #[error("You can only invite friends to competitions")]
    NotFriends,

    #[error("Competition creator cannot leave the competition")]
    CreatorCannotLeave,

    #[error("You are not participating in this competition")]
    NotParticipating,

    #[error("Invitation not found or already handled")]
    InvitationNotPending,

    #[error("Competition is already cancelled")]
    CompetitionAlreadyCancelled,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound => "UNKNOWN_USER",
            Self::CompetitionNotFound => "UNKNOWN_COMPETITION",
            Self::FriendRequestNotFound => "UNKNOWN_FRIEND_REQUEST",
            Self::FriendshipNotFound => "UNKNOWN_FRIENDSHIP",
            Self::ParticipantNotFound => "UNKNOWN_PARTICIPANT",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidUsername(_) => "INVALID_USERNAME",
            Self::InvalidDateRange => "INVALID_DATE_RANGE",
            Self::InvalidScreenTime => "INVALID_SCREEN_TIME",

            // Authorization
            Self::NotCompetitionCreator => "NOT_COMPETITION_CREATOR",
            Self::CannotCancelCompetition => "NOT_COMPETITION_CREATOR",
            Self::NoCompetitionAccess => "NO_COMPETITION_ACCESS",

            // Conflict
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::UsernameAlreadyExists => "USERNAME_ALREADY_EXISTS",
            Self::FriendRequestAlreadySent => "FRIEND_REQUEST_EXISTS",
            Self::AlreadyFriends => "ALREADY_FRIENDS",
            Self::AlreadyInvited => "ALREADY_INVITED",
            Self::AlreadyParticipating => "ALREADY_PARTICIPATING",

            // Business Rules
            Self::CannotFriendSelf => "CANNOT_FRIEND_SELF",
            Self::NotFriends => "NOT_FRIENDS",
            Self::CreatorCannotLeave => "CREATOR_CANNOT_LEAVE",
            Self::NotParticipating => "NOT_PARTICIPATING",
            Self::InvitationNotPending => "INVITATION_NOT_PENDING",
            Self::CompetitionAlreadyCancelled => "COMPETITION_CANCELLED",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound
                | Self::CompetitionNotFound
                | Self::FriendRequestNotFound
                | Self::FriendshipNotFound
                | Self::ParticipantNotFound
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidUsername(_)
                | Self::InvalidDateRange
                | Self::InvalidScreenTime
        )
    }

    /// Access denial (403)
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::NotCompetitionCreator | Self::CannotCancelCompetition | Self::NoCompetitionAccess
        )
    }

    /// Duplicate request, invitation, membership or identity
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::EmailAlreadyExists
                | Self::UsernameAlreadyExists
                | Self::FriendRequestAlreadySent
                | Self::AlreadyFriends
                | Self::AlreadyInvited
                | Self::AlreadyParticipating
        )
    }

    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            Self::CannotFriendSelf
                | Self::NotFriends
                | Self::CreatorCannotLeave
                | Self::NotParticipating
                | Self::InvitationNotPending
                | Self::CompetitionAlreadyCancelled
        )
    }
}
