//! Route handlers, organized by domain area

pub mod auth;
pub mod competitions;
pub mod friends;
pub mod health;
pub mod invitations;
pub mod profile;
pub mod screen_time;
