//! End-to-end API tests
//!
//! These tests require a running PostgreSQL instance and the environment
//! variables DATABASE_URL and JWT_SECRET. They skip themselves otherwise.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_error, assert_json, assert_status, check_test_env, fixtures::*, TestServer,
};
use reqwest::StatusCode;
use serde_json::json;

async fn signup(server: &TestServer) -> TestUser {
    let request = SignupRequest::unique();
    let response = server.post("/signup", &request).await.unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    TestUser {
        token: auth.token,
        id: auth.user.id,
        username: auth.user.username,
    }
}

async fn befriend(server: &TestServer, a: &TestUser, b: &TestUser) {
    let response = server
        .post_auth("/send-request", &a.token, &json!({ "username": b.username }))
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post_auth("/send-request", &b.token, &json!({ "username": a.username }))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
}

async fn create_competition(
    server: &TestServer,
    creator: &TestUser,
    request: &CreateCompetitionRequest,
) -> CompetitionDetail {
    let response = server
        .post_auth("/competitions/create", &creator.token, request)
        .await
        .unwrap();
    assert_json(response, StatusCode::CREATED).await.unwrap()
}

async fn invite_and_accept(
    server: &TestServer,
    creator: &TestUser,
    competition_id: &str,
    invitee: &TestUser,
) {
    let response = server
        .post_auth(
            "/competitions/invitations/send",
            &creator.token,
            &json!({ "competition_id": competition_id, "username": invitee.username }),
        )
        .await
        .unwrap();
    let invitation: InvitationEntry = assert_json(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post_auth(
            "/competitions/invitations/handle",
            &invitee.token,
            &json!({ "invitation_id": invitation.id, "action": "accept" }),
        )
        .await
        .unwrap();
    let handled: InvitationHandled = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(handled.success, "Invitation accepted");
}

async fn report(server: &TestServer, user: &TestUser, minutes: f64) -> ScreenTimeUpdate {
    let response = server
        .post_auth(
            "/competitions/screen-time/update",
            &user.token,
            &json!({ "screen_time_minutes": minutes }),
        )
        .await
        .unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

async fn detail(server: &TestServer, user: &TestUser, competition_id: &str) -> CompetitionDetail {
    let response = server
        .get_auth(&format!("/competitions/{competition_id}"), &user.token)
        .await
        .unwrap();
    assert_json(response, StatusCode::OK).await.unwrap()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_probes() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server.get("/health/ready").await.unwrap();
    let body: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["database"], "up");
}

// ============================================================================
// Auth and profile
// ============================================================================

#[tokio::test]
async fn test_signup_and_login() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let request = SignupRequest::unique();

    let response = server.post("/signup", &request).await.unwrap();
    let created: AuthResponse = assert_json(response, StatusCode::CREATED).await.unwrap();
    assert_eq!(created.user.username, request.username);

    let response = server
        .post("/login", &LoginRequest::from_signup(&request))
        .await
        .unwrap();
    let auth: AuthResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(auth.user.id, created.user.id);

    let response = server.get_auth("/isauth", &auth.token).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    // Duplicate email
    let response = server.post("/signup", &request).await.unwrap();
    let message = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(message, "Email already registered");
}

#[tokio::test]
async fn test_profile_round_trip() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let user = signup(&server).await;

    let response = server
        .put_auth(
            "/profile/update",
            &user.token,
            &json!({ "name": "Focus Fan", "focus_mode": true }),
        )
        .await
        .unwrap();
    let profile: serde_json::Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(profile["name"], "Focus Fan");
    assert_eq!(profile["focus_mode"], true);

    let response = server.delete_auth("/profile/delete", &user.token).await.unwrap();
    assert_status(response, StatusCode::NO_CONTENT).await.unwrap();

    let response = server.get_auth("/profile", &user.token).await.unwrap();
    assert_status(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Friendships
// ============================================================================

#[tokio::test]
async fn test_friendship_is_symmetric() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = signup(&server).await;
    let bob = signup(&server).await;
    befriend(&server, &alice, &bob).await;

    for (user, other) in [(&alice, &bob), (&bob, &alice)] {
        let response = server.get_auth("/friendships", &user.token).await.unwrap();
        let friends: Vec<UserResponse> = assert_json(response, StatusCode::OK).await.unwrap();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].id, other.id);

        let response = server.get_auth("/friend-requests", &user.token).await.unwrap();
        let requests: FriendRequests = assert_json(response, StatusCode::OK).await.unwrap();
        assert!(requests.sent_requests.is_empty());
        assert!(requests.received_requests.is_empty());
    }

    let response = server
        .post_auth("/delete-friend", &bob.token, &json!({ "friend_id": alice.id }))
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    for user in [&alice, &bob] {
        let response = server.get_auth("/friendships", &user.token).await.unwrap();
        let friends: Vec<UserResponse> = assert_json(response, StatusCode::OK).await.unwrap();
        assert!(friends.is_empty());
    }
}

#[tokio::test]
async fn test_friend_request_handling() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let alice = signup(&server).await;
    let bob = signup(&server).await;

    let response = server
        .post_auth("/send-request", &alice.token, &json!({ "user_id": bob.id }))
        .await
        .unwrap();
    assert_status(response, StatusCode::CREATED).await.unwrap();

    let response = server
        .post_auth("/send-request", &alice.token, &json!({ "username": bob.username }))
        .await
        .unwrap();
    let message = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(message, "Friend request already sent");

    let response = server.get_auth("/friend-requests", &bob.token).await.unwrap();
    let requests: FriendRequests = assert_json(response, StatusCode::OK).await.unwrap();
    let request_id = &requests.received_requests[0].id;

    let response = server
        .post_auth(
            "/handle-request",
            &bob.token,
            &json!({ "request_id": request_id, "action": "reject" }),
        )
        .await
        .unwrap();
    let body: SuccessBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body.success, format!("Friend request from {} rejected", alice.username));

    let response = server.get_auth("/friendships", &alice.token).await.unwrap();
    let friends: Vec<UserResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(friends.is_empty());
}

// ============================================================================
// Competitions and ranking
// ============================================================================

#[tokio::test]
async fn test_two_reports_average_to_45() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let creator = signup(&server).await;
    let player = signup(&server).await;
    befriend(&server, &creator, &player).await;

    let competition = create_competition(&server, &creator, &CreateCompetitionRequest::running()).await;
    assert_eq!(competition.status, "active");
    assert!(competition.is_creator);
    invite_and_accept(&server, &creator, &competition.id, &player).await;

    let update = report(&server, &player, 30.0).await;
    assert!(update.updated_competitions.iter().any(|c| c.id == competition.id));
    report(&server, &player, 60.0).await;

    let view = detail(&server, &player, &competition.id).await;
    assert_eq!(view.leaderboard.ranked.len(), 1);
    let leader = &view.leaderboard.ranked[0];
    assert_eq!(leader.user.id, player.id);
    assert_eq!(leader.average_daily_usage, Some(45.0));
    assert_eq!(leader.position, Some(1));

    // The creator has no data yet and trails
    assert_eq!(view.leaderboard.unranked.len(), 1);
    assert_eq!(view.leaderboard.unranked[0].position, Some(2));
}

#[tokio::test]
async fn test_lower_usage_ranks_first() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let creator = signup(&server).await;
    let a = signup(&server).await;
    let b = signup(&server).await;
    befriend(&server, &creator, &a).await;
    befriend(&server, &creator, &b).await;

    let competition = create_competition(&server, &creator, &CreateCompetitionRequest::running()).await;
    invite_and_accept(&server, &creator, &competition.id, &a).await;
    invite_and_accept(&server, &creator, &competition.id, &b).await;

    report(&server, &a, 45.0).await;
    report(&server, &b, 30.0).await;

    let first = detail(&server, &creator, &competition.id).await;
    let order: Vec<_> = first
        .leaderboard
        .ranked
        .iter()
        .map(|p| (p.user.id.clone(), p.position))
        .collect();
    assert_eq!(order, vec![(b.id.clone(), Some(1)), (a.id.clone(), Some(2))]);
    assert_eq!(first.total_participants, 3);

    // Reading again without writes changes nothing
    let second = detail(&server, &creator, &competition.id).await;
    let positions = |d: &CompetitionDetail| -> Vec<Option<i32>> {
        d.participants.iter().map(|p| p.position).collect()
    };
    assert_eq!(positions(&first), positions(&second));
    assert_eq!(positions(&first), vec![Some(1), Some(2), Some(3)]);
}

#[tokio::test]
async fn test_concurrent_reports_keep_ranks_dense() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let creator = signup(&server).await;
    let competition = create_competition(&server, &creator, &CreateCompetitionRequest::running()).await;

    let mut players = Vec::new();
    for _ in 0..6 {
        let player = signup(&server).await;
        befriend(&server, &creator, &player).await;
        invite_and_accept(&server, &creator, &competition.id, &player).await;
        players.push(player);
    }

    tokio::join!(
        report(&server, &players[0], 50.0),
        report(&server, &players[1], 40.0),
        report(&server, &players[2], 30.0),
        report(&server, &players[3], 20.0),
        report(&server, &players[4], 10.0),
        report(&server, &players[5], 0.0),
    );

    let view = detail(&server, &creator, &competition.id).await;
    let ranked: Vec<i32> = view
        .leaderboard
        .ranked
        .iter()
        .filter_map(|p| p.position)
        .collect();
    assert_eq!(ranked, (1..=6).collect::<Vec<_>>());
    assert_eq!(view.leaderboard.unranked[0].position, Some(7));
}

#[tokio::test]
async fn test_invitation_errors() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let creator = signup(&server).await;
    let friend = signup(&server).await;
    let stranger = signup(&server).await;
    befriend(&server, &creator, &friend).await;
    let competition = create_competition(&server, &creator, &CreateCompetitionRequest::upcoming()).await;
    assert_eq!(competition.status, "upcoming");

    let competition_id = competition.id.clone();
    let server_ref = &server;
    let send = move |sender: &TestUser, username: &str| {
        let body = json!({ "competition_id": competition_id, "username": username });
        let token = sender.token.clone();
        async move {
            server_ref
                .post_auth("/competitions/invitations/send", &token, &body)
                .await
                .unwrap()
        }
    };

    let message = assert_error(send(&creator, &stranger.username).await, StatusCode::BAD_REQUEST)
        .await
        .unwrap();
    assert_eq!(message, "You can only invite friends to competitions");

    let message = assert_error(send(&friend, &stranger.username).await, StatusCode::FORBIDDEN)
        .await
        .unwrap();
    assert_eq!(message, "Only the creator of the competition can send invitations");

    let message = assert_error(send(&creator, "nobody-here").await, StatusCode::NOT_FOUND)
        .await
        .unwrap();
    assert_eq!(message, "User not found");

    assert_status(send(&creator, &friend.username).await, StatusCode::CREATED)
        .await
        .unwrap();
    let message = assert_error(send(&creator, &friend.username).await, StatusCode::BAD_REQUEST)
        .await
        .unwrap();
    assert_eq!(message, "User already invited");

    let response = server
        .get_auth("/competitions/invitations", &friend.token)
        .await
        .unwrap();
    let pending: Vec<InvitationEntry> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].status, "pending");
    assert_eq!(pending[0].sender.id, creator.id);
    assert_eq!(pending[0].receiver.id, friend.id);

    let handle = json!({ "invitation_id": pending[0].id, "action": "accept" });
    let response = server
        .post_auth("/competitions/invitations/handle", &friend.token, &handle)
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server
        .post_auth("/competitions/invitations/handle", &friend.token, &handle)
        .await
        .unwrap();
    let message = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(message, "Invitation not found or already handled");

    let message = assert_error(send(&creator, &friend.username).await, StatusCode::BAD_REQUEST)
        .await
        .unwrap();
    assert_eq!(message, "User already participating");
}

#[tokio::test]
async fn test_leave_rules() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let creator = signup(&server).await;
    let player = signup(&server).await;
    let outsider = signup(&server).await;
    befriend(&server, &creator, &player).await;

    let competition = create_competition(&server, &creator, &CreateCompetitionRequest::running()).await;
    invite_and_accept(&server, &creator, &competition.id, &player).await;
    let leave = format!("/competitions/{}/leave", competition.id);

    let response = server.post_auth(&leave, &creator.token, &json!({})).await.unwrap();
    let message = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(message, "Competition creator cannot leave the competition");

    let response = server.post_auth(&leave, &outsider.token, &json!({})).await.unwrap();
    let message = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(message, "You are not participating in this competition");

    let response = server
        .get_auth(&format!("/competitions/{}", competition.id), &outsider.token)
        .await
        .unwrap();
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();

    let response = server.post_auth(&leave, &player.token, &json!({})).await.unwrap();
    let body: SuccessBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(
        body.success,
        format!("You have left the competition '{}'", competition.title)
    );

    let view = detail(&server, &creator, &competition.id).await;
    assert_eq!(view.total_participants, 1);
    assert_eq!(view.creator.id, creator.id);
}

#[tokio::test]
async fn test_listings_and_cancel() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let creator = signup(&server).await;
    let running = create_competition(&server, &creator, &CreateCompetitionRequest::running()).await;
    let upcoming = create_competition(&server, &creator, &CreateCompetitionRequest::upcoming()).await;

    let response = server.get_auth("/competitions", &creator.token).await.unwrap();
    let all: Vec<CompetitionSummary> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|c| c.is_creator && c.participant_count == 1));

    let response = server.get_auth("/competitions/active", &creator.token).await.unwrap();
    let active: Vec<CompetitionSummary> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, running.id);

    let response = server.get_auth("/competitions/future", &creator.token).await.unwrap();
    let future: Vec<CompetitionSummary> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(future.len(), 1);
    assert_eq!(future[0].id, upcoming.id);

    let response = server
        .post_auth(&format!("/competitions/{}/cancel", running.id), &creator.token, &json!({}))
        .await
        .unwrap();
    let cancelled: CompetitionDetail = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(cancelled.status, "cancelled");

    let response = server.get_auth("/competitions/active", &creator.token).await.unwrap();
    let active: Vec<CompetitionSummary> = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(active.is_empty());
}
