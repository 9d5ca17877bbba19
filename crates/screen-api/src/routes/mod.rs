//! Route table

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{auth, competitions, friends, health, invitations, profile, screen_time};
use crate::state::AppState;

/// Every authenticated and public API route, without health probes
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(profile_routes())
        .merge(friend_routes())
        .merge(competition_routes())
}

/// Health probes, kept apart so rate limiting does not apply to them
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/isauth", get(auth::is_authenticated))
}

fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile::get_profile))
        .route("/profile/update", put(profile::update_profile))
        .route("/profile/delete", delete(profile::delete_account))
}

fn friend_routes() -> Router<AppState> {
    Router::new()
        .route("/send-request", post(friends::send_request))
        .route("/handle-request", post(friends::handle_request))
        .route("/friend-requests", get(friends::list_requests))
        .route("/friendships", get(friends::list_friends))
        .route("/delete-friend", post(friends::delete_friend))
}

fn competition_routes() -> Router<AppState> {
    Router::new()
        .route("/competitions", get(competitions::list_competitions))
        .route("/competitions/active", get(competitions::list_active))
        .route("/competitions/future", get(competitions::list_future))
        .route("/competitions/create", post(competitions::create_competition))
        // Static segments take priority over `:id`
        .route("/competitions/invitations", get(invitations::list_invitations))
        .route("/competitions/invitations/sent", get(invitations::list_sent_invitations))
        .route("/competitions/invitations/send", post(invitations::send_invitation))
        .route("/competitions/invitations/handle", post(invitations::handle_invitation))
        .route(
            "/competitions/screen-time/update",
            post(screen_time::update_screen_time),
        )
        .route("/competitions/:id", get(competitions::get_competition))
        .route("/competitions/:id/leave", post(competitions::leave_competition))
        .route("/competitions/:id/cancel", post(competitions::cancel_competition))
}
