//! Competition handlers

use axum::{extract::State, Json};
use screen_service::dto::{
    CompetitionDetailResponse, CompetitionSummaryResponse, CreateCompetitionRequest,
    SuccessResponse,
};
use screen_service::CompetitionService;

use crate::extractors::{AuthUser, CompetitionIdPath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// GET /competitions
pub async fn list_competitions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<CompetitionSummaryResponse>>> {
    let response = CompetitionService::new(state.service_context())
        .list(auth.user_id)
        .await?;
    Ok(Json(response))
}

/// GET /competitions/active
pub async fn list_active(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<CompetitionSummaryResponse>>> {
    let response = CompetitionService::new(state.service_context())
        .list_active(auth.user_id)
        .await?;
    Ok(Json(response))
}

/// GET /competitions/future
pub async fn list_future(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<CompetitionSummaryResponse>>> {
    let response = CompetitionService::new(state.service_context())
        .list_future(auth.user_id)
        .await?;
    Ok(Json(response))
}

/// POST /competitions/create
pub async fn create_competition(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateCompetitionRequest>,
) -> ApiResult<Created<Json<CompetitionDetailResponse>>> {
    let response = CompetitionService::new(state.service_context())
        .create(auth.user_id, request)
        .await?;
    Ok(Created(Json(response)))
}

/// GET /competitions/:id
pub async fn get_competition(
    State(state): State<AppState>,
    auth: AuthUser,
    CompetitionIdPath(competition_id): CompetitionIdPath,
) -> ApiResult<Json<CompetitionDetailResponse>> {
    let response = CompetitionService::new(state.service_context())
        .detail(competition_id, auth.user_id)
        .await?;
    Ok(Json(response))
}

/// POST /competitions/:id/leave
pub async fn leave_competition(
    State(state): State<AppState>,
    auth: AuthUser,
    CompetitionIdPath(competition_id): CompetitionIdPath,
) -> ApiResult<Json<SuccessResponse>> {
    let response = CompetitionService::new(state.service_context())
        .leave(competition_id, auth.user_id)
        .await?;
    Ok(Json(response))
}

/// POST /competitions/:id/cancel
pub async fn cancel_competition(
    State(state): State<AppState>,
    auth: AuthUser,
    CompetitionIdPath(competition_id): CompetitionIdPath,
) -> ApiResult<Json<CompetitionDetailResponse>> {
    let response = CompetitionService::new(state.service_context())
        .cancel(competition_id, auth.user_id)
        .await?;
    Ok(Json(response))
}
