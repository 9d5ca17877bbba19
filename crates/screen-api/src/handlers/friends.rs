//! Friend request and friendship handlers

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use screen_service::dto::{
    DeleteFriendRequest, FriendRequestsResponse, HandleFriendRequestRequest,
    SendFriendRequestRequest, SuccessResponse, UserResponse,
};
use screen_service::FriendshipService;

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// POST /send-request
///
/// 201 when a request is created, 200 when it completed a pending reverse request.
pub async fn send_request(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<SendFriendRequestRequest>,
) -> ApiResult<Response> {
    let outcome = FriendshipService::new(state.service_context())
        .send_request(auth.user_id, request)
        .await?;

    Ok(if outcome.is_created() {
        Created(Json(outcome.into_body())).into_response()
    } else {
        Json(outcome.into_body()).into_response()
    })
}

/// POST /handle-request
pub async fn handle_request(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<HandleFriendRequestRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let response = FriendshipService::new(state.service_context())
        .respond(auth.user_id, request)
        .await?;
    Ok(Json(response))
}

/// GET /friend-requests
pub async fn list_requests(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<FriendRequestsResponse>> {
    let response = FriendshipService::new(state.service_context())
        .list_requests(auth.user_id)
        .await?;
    Ok(Json(response))
}

/// GET /friendships
pub async fn list_friends(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let response = FriendshipService::new(state.service_context())
        .list_friends(auth.user_id)
        .await?;
    Ok(Json(response))
}

/// POST /delete-friend
pub async fn delete_friend(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<DeleteFriendRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let response = FriendshipService::new(state.service_context())
        .delete_friendship(auth.user_id, request)
        .await?;
    Ok(Json(response))
}
