//! Friend request model -> entity

use screen_core::entities::{FriendRequest, FriendRequestStatus};
use screen_core::error::DomainError;
use screen_core::value_objects::Snowflake;

use crate::models::FriendRequestModel;

impl TryFrom<FriendRequestModel> for FriendRequest {
    type Error = DomainError;

    fn try_from(model: FriendRequestModel) -> Result<Self, Self::Error> {
        let status = FriendRequestStatus::parse(&model.status).ok_or_else(|| {
            DomainError::DatabaseError(format!("unknown friend request status '{}'", model.status))
        })?;

        Ok(FriendRequest {
            id: Snowflake::new(model.id),
            sender_id: Snowflake::new(model.sender_id),
            receiver_id: Snowflake::new(model.receiver_id),
            status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
