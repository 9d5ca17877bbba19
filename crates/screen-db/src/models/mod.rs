//! Database models - SQLx-compatible structs for PostgreSQL tables

mod competition;
mod friendship;
mod invitation;
mod participant;
mod user;

pub use competition::CompetitionModel;
pub use friendship::FriendRequestModel;
pub use invitation::InvitationModel;
pub use participant::ParticipantModel;
pub use user::{ProfileModel, UserModel};
