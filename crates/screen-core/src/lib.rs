//! # screen-core
//!
//! Domain layer for the screen-time competition backend: entities, the ranking rules,
//! repository traits and domain errors.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod ranking;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Competition, CompetitionInvitation, CompetitionStatus, FriendRequest, FriendRequestAction,
    FriendRequestStatus, InvitationAction, InvitationStatus, Participant, Profile, ProfileUpdate,
    User,
};
pub use error::DomainError;
pub use ranking::{Leaderboard, RankAssignment};
pub use traits::{
    CompetitionRepository, FriendshipRepository, InvitationRepository, ParticipantRepository,
    ProfileRepository, RepoResult, RequestDelivery, UserRepository,
};
pub use value_objects::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
