//! User/profile model -> entity

use screen_core::entities::{Profile, User};
use screen_core::value_objects::Snowflake;

use crate::models::{ProfileModel, UserModel};

impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: Snowflake::new(model.id),
            username: model.username,
            email: model.email,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<ProfileModel> for Profile {
    fn from(model: ProfileModel) -> Self {
        Profile {
            user_id: Snowflake::new(model.user_id),
            name: model.name,
            avatar: model.avatar,
            daily_screen_time_goal: model.daily_screen_time_goal,
            total_screen_time: model.total_screen_time,
            focus_mode: model.focus_mode,
            updated_at: model.updated_at,
        }
    }
}
