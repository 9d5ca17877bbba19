//! Path parameter extractors

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use screen_core::Snowflake;
use serde::Deserialize;

use crate::response::ApiError;

#[derive(Debug, Deserialize)]
struct RawCompetitionId {
    id: String,
}

/// `:id` segment of `/competitions/:id/...`
#[derive(Debug, Clone, Copy)]
pub struct CompetitionIdPath(pub Snowflake);

#[async_trait]
impl<S> FromRequestParts<S> for CompetitionIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<RawCompetitionId>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        // A malformed id cannot name an existing competition
        raw.id
            .parse()
            .map(CompetitionIdPath)
            .map_err(|_| ApiError::Domain(screen_core::DomainError::CompetitionNotFound))
    }
}
