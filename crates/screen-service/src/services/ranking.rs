//! Ranking service
//!
//! Folds usage reports into participant averages and keeps every affected
//! competition's positions dense. The storage layer runs each update and its
//! re-rank under a per-competition lock.

use chrono::Utc;
use screen_core::{DomainError, Leaderboard, Participant, Snowflake};
use tracing::{debug, info, instrument};

use crate::dto::{ScreenTimeUpdateResponse, UpdateScreenTimeRequest};

use super::competition::summarize;
use super::context::ServiceContext;
use super::error::ServiceResult;

pub struct RankingService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RankingService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record one usage report for the user.
    ///
    /// Only competitions whose window contains the current instant are touched;
    /// the cancellation flag is not consulted. A competition the user stops
    /// belonging to mid-report is skipped. The report date is logged but not
    /// used: the average is the two-point blend from `ranking::next_average`.
    #[instrument(skip(self, request))]
    pub async fn record_usage(
        &self,
        user_id: Snowflake,
        request: UpdateScreenTimeRequest,
    ) -> ServiceResult<ScreenTimeUpdateResponse> {
        let minutes = request
            .screen_time_minutes
            .filter(|m| m.is_finite() && *m >= 0.0)
            .ok_or(DomainError::InvalidScreenTime)?;
        let now = Utc::now();
        let date = request.date.unwrap_or_else(|| now.date_naive());

        let running = self
            .ctx
            .competition_repo()
            .list_running_for_user(user_id, now)
            .await?;

        let mut updated = Vec::with_capacity(running.len());
        for competition in running {
            match self
                .ctx
                .participant_repo()
                .record_usage(competition.id, user_id, minutes)
                .await
            {
                Ok(participant) => {
                    debug!(
                        competition_id = %competition.id,
                        position = ?participant.position,
                        average = ?participant.average_daily_usage,
                        "Usage recorded"
                    );
                    updated.push(competition);
                }
                // Left or deleted after the listing
                Err(DomainError::ParticipantNotFound | DomainError::CompetitionNotFound) => {
                    debug!(competition_id = %competition.id, "Membership gone, report skipped");
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.ctx
            .profile_repo()
            .add_screen_time(user_id, minutes)
            .await?;

        info!(%date, minutes, competitions = updated.len(), "Screen time updated");

        Ok(ScreenTimeUpdateResponse {
            updated_competitions: summarize(self.ctx, &updated, user_id, now).await?,
        })
    }

    /// Re-rank every participant of a competition
    #[instrument(skip(self))]
    pub async fn recalculate(&self, competition_id: Snowflake) -> ServiceResult<Vec<Participant>> {
        Ok(self
            .ctx
            .participant_repo()
            .recalculate(competition_id)
            .await?)
    }

    /// Persisted ranking, split into ranked and unranked participants
    #[instrument(skip(self))]
    pub async fn leaderboard(&self, competition_id: Snowflake) -> ServiceResult<Leaderboard> {
        let participants = self
            .ctx
            .participant_repo()
            .list_by_competition(competition_id)
            .await?;
        Ok(Leaderboard::from_participants(participants))
    }
}
