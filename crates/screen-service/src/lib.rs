//! # screen-service
//!
//! Application layer: the use cases behind every HTTP endpoint, the request and
//! response DTOs, and the dependency container that wires repositories in.

pub mod dto;
pub mod services;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use services::{
    AuthService, CompetitionService, FriendRequestOutcome, FriendshipService, InvitationService,
    ProfileService, RankingService, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult,
};
