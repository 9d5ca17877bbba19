//! Domain entities - core business objects

mod competition;
mod friendship;
mod invitation;
mod participant;
mod user;

pub use competition::{Competition, CompetitionStatus, TITLE_MAX_LEN};
pub use friendship::{FriendRequest, FriendRequestAction, FriendRequestStatus};
pub use invitation::{CompetitionInvitation, InvitationAction, InvitationStatus};
pub use participant::Participant;
pub use user::{Profile, ProfileUpdate, User, PROFILE_NAME_MAX_LEN, USERNAME_MAX_LEN};
