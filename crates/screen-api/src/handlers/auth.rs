//! Authentication handlers

use axum::{extract::State, Json};
use screen_service::dto::{AuthResponse, LoginRequest, MessageResponse, SignupRequest};
use screen_service::AuthService;

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// POST /signup
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> ApiResult<Created<Json<AuthResponse>>> {
    let response = AuthService::new(state.service_context()).signup(request).await?;
    Ok(Created(Json(response)))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response = AuthService::new(state.service_context()).login(request).await?;
    Ok(Json(response))
}

/// GET /isauth
pub async fn is_authenticated(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<MessageResponse>> {
    let response = AuthService::new(state.service_context())
        .is_authenticated(auth.user_id)
        .await?;
    Ok(Json(response))
}
