//! Business logic services

mod auth;
mod competition;
mod context;
mod error;
mod friendship;
mod invitation;
mod profile;
mod ranking;

pub use auth::AuthService;
pub use competition::CompetitionService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use friendship::{FriendRequestOutcome, FriendshipService};
pub use invitation::InvitationService;
pub use profile::ProfileService;
pub use ranking::RankingService;
