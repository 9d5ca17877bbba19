//! Repository traits (ports)

mod repositories;

pub use repositories::{
    CompetitionRepository, FriendshipRepository, InvitationRepository, ParticipantRepository,
    ProfileRepository, RepoResult, RequestDelivery, UserRepository,
};
