//! Competition/participant model -> entity

use screen_core::entities::{Competition, Participant};
use screen_core::value_objects::Snowflake;

use crate::models::{CompetitionModel, ParticipantModel};

impl From<CompetitionModel> for Competition {
    fn from(model: CompetitionModel) -> Self {
        Competition {
            id: Snowflake::new(model.id),
            title: model.title,
            description: model.description,
            creator_id: Snowflake::new(model.creator_id),
            start_date: model.start_date,
            end_date: model.end_date,
            cancelled: model.cancelled,
            created_at: model.created_at,
        }
    }
}

impl From<ParticipantModel> for Participant {
    fn from(model: ParticipantModel) -> Self {
        Participant {
            id: Snowflake::new(model.id),
            competition_id: Snowflake::new(model.competition_id),
            user_id: Snowflake::new(model.user_id),
            joined_at: model.joined_at,
            position: model.position,
            average_daily_usage: model.average_daily_usage,
        }
    }
}
