//! Invitation model -> entity

use screen_core::entities::{CompetitionInvitation, InvitationStatus};
use screen_core::error::DomainError;
use screen_core::value_objects::Snowflake;

use crate::models::InvitationModel;

impl TryFrom<InvitationModel> for CompetitionInvitation {
    type Error = DomainError;

    fn try_from(model: InvitationModel) -> Result<Self, Self::Error> {
        let status = InvitationStatus::parse(&model.status).ok_or_else(|| {
            DomainError::DatabaseError(format!("unknown invitation status '{}'", model.status))
        })?;

        Ok(CompetitionInvitation {
            id: Snowflake::new(model.id),
            competition_id: Snowflake::new(model.competition_id),
            sender_id: Snowflake::new(model.sender_id),
            receiver_id: Snowflake::new(model.receiver_id),
            status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
