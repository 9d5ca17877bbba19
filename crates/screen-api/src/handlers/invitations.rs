//! Competition invitation handlers

use axum::{extract::State, Json};
use screen_service::dto::{
    HandleInvitationRequest, InvitationHandledResponse, InvitationResponse, SendInvitationRequest,
};
use screen_service::InvitationService;

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// GET /competitions/invitations
pub async fn list_invitations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<InvitationResponse>>> {
    let response = InvitationService::new(state.service_context())
        .list_pending(auth.user_id)
        .await?;
    Ok(Json(response))
}

/// GET /competitions/invitations/sent
pub async fn list_sent_invitations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<InvitationResponse>>> {
    let response = InvitationService::new(state.service_context())
        .list_sent(auth.user_id)
        .await?;
    Ok(Json(response))
}

/// POST /competitions/invitations/send
pub async fn send_invitation(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<SendInvitationRequest>,
) -> ApiResult<Created<Json<InvitationResponse>>> {
    let response = InvitationService::new(state.service_context())
        .send(auth.user_id, request)
        .await?;
    Ok(Created(Json(response)))
}

/// POST /competitions/invitations/handle
pub async fn handle_invitation(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<HandleInvitationRequest>,
) -> ApiResult<Json<InvitationHandledResponse>> {
    let response = InvitationService::new(state.service_context())
        .respond(auth.user_id, request)
        .await?;
    Ok(Json(response))
}
