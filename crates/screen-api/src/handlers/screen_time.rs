//! Usage reporting

use axum::{extract::State, Json};
use screen_service::dto::{ScreenTimeUpdateResponse, UpdateScreenTimeRequest};
use screen_service::RankingService;

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// POST /competitions/screen-time/update
pub async fn update_screen_time(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<UpdateScreenTimeRequest>,
) -> ApiResult<Json<ScreenTimeUpdateResponse>> {
    let response = RankingService::new(state.service_context())
        .record_usage(auth.user_id, request)
        .await?;
    Ok(Json(response))
}
