//! User account and its 1:1 profile

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Maximum username length in characters
pub const USERNAME_MAX_LEN: usize = 20;

/// Maximum profile display-name length in characters
pub const PROFILE_NAME_MAX_LEN: usize = 40;

/// Account identity. Email and username are each unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: Snowflake, username: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            email,
            created_at: now,
            updated_at: now,
        }
    }

    /// Usernames are 1..=20 characters of letters, digits and `@.+-_`
    pub fn validate_username(username: &str) -> Result<(), DomainError> {
        let len = username.chars().count();
        if len == 0 || len > USERNAME_MAX_LEN {
            return Err(DomainError::InvalidUsername(format!(
                "must be between 1 and {USERNAME_MAX_LEN} characters"
            )));
        }
        if !username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
        {
            return Err(DomainError::InvalidUsername(
                "may only contain letters, digits and @/./+/-/_".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-user profile
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: Snowflake,
    pub name: String,
    /// Stored reference to an avatar image; the file itself lives elsewhere
    pub avatar: Option<String>,
    /// Daily usage goal in minutes
    pub daily_screen_time_goal: Option<i32>,
    /// Cumulative minutes across every recorded usage value
    pub total_screen_time: f64,
    pub focus_mode: bool,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Fresh profile for a new account, named after the username unless a name is given
    pub fn new(user_id: Snowflake, name: String) -> Self {
        Self {
            user_id,
            name,
            avatar: None,
            daily_screen_time_goal: None,
            total_screen_time: 0.0,
            focus_mode: false,
            updated_at: Utc::now(),
        }
    }

    /// Apply a partial update. Returns true if anything changed.
    pub fn apply(&mut self, update: &ProfileUpdate) -> bool {
        let before = self.clone();

        if let Some(name) = &update.name {
            self.name.clone_from(name);
        }
        if let Some(avatar) = &update.avatar {
            self.avatar = Some(avatar.clone());
        }
        if let Some(goal) = update.daily_screen_time_goal {
            self.daily_screen_time_goal = Some(goal);
        }
        if let Some(focus) = update.focus_mode {
            self.focus_mode = focus;
        }

        let changed = *self != before;
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }
}

/// Partial profile update; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub daily_screen_time_goal: Option<i32>,
    pub focus_mode: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(User::validate_username("alice_01").is_ok());
        assert!(User::validate_username("").is_err());
        assert!(User::validate_username(&"a".repeat(USERNAME_MAX_LEN + 1)).is_err());
        assert!(User::validate_username("bad name").is_err());
    }

    #[test]
    fn test_apply_partial_update() {
        let mut profile = Profile::new(Snowflake::new(1), "alice".to_string());
        let changed = profile.apply(&ProfileUpdate {
            daily_screen_time_goal: Some(120),
            focus_mode: Some(true),
            ..Default::default()
        });

        assert!(changed);
        assert_eq!(profile.name, "alice");
        assert_eq!(profile.daily_screen_time_goal, Some(120));
        assert!(profile.focus_mode);
    }

    #[test]
    fn test_apply_noop_keeps_timestamp() {
        let mut profile = Profile::new(Snowflake::new(1), "alice".to_string());
        let stamp = profile.updated_at;
        assert!(!profile.apply(&ProfileUpdate {
            name: Some("alice".to_string()),
            ..Default::default()
        }));
        assert_eq!(profile.updated_at, stamp);
    }
}
