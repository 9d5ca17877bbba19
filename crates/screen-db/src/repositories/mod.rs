//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in screen-core.

mod competition;
mod error;
mod friendship;
mod invitation;
mod participant;
mod user;

pub use competition::PgCompetitionRepository;
pub use friendship::PgFriendshipRepository;
pub use invitation::PgInvitationRepository;
pub use participant::PgParticipantRepository;
pub use user::{PgProfileRepository, PgUserRepository};
