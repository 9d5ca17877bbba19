//! Profile handlers

use axum::{extract::State, Json};
use screen_service::dto::{ProfileResponse, UpdateProfileRequest};
use screen_service::ProfileService;

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// GET /profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ProfileResponse>> {
    let response = ProfileService::new(state.service_context())
        .get_profile(auth.user_id)
        .await?;
    Ok(Json(response))
}

/// PUT /profile/update
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let response = ProfileService::new(state.service_context())
        .update_profile(auth.user_id, request)
        .await?;
    Ok(Json(response))
}

/// DELETE /profile/delete
pub async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<NoContent> {
    ProfileService::new(state.service_context())
        .delete_account(auth.user_id)
        .await?;
    Ok(NoContent)
}
