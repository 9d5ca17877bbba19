//! Competition service
//!
//! Creation, listings, detail, leaving and cancellation. Status is always
//! derived from the clock at the moment of the call.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use screen_core::{
    Competition, CompetitionStatus, DomainError, Leaderboard, Participant, Snowflake, User,
};
use tracing::{info, instrument};

use crate::dto::{
    CompetitionDetailResponse, CompetitionSummaryResponse, CreateCompetitionRequest,
    LeaderboardResponse, ParticipantResponse, SuccessResponse, UserResponse,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Fetch users by id into a lookup table
pub(crate) async fn users_by_id(
    ctx: &ServiceContext,
    ids: impl IntoIterator<Item = Snowflake>,
) -> ServiceResult<HashMap<Snowflake, User>> {
    let mut ids: Vec<Snowflake> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    Ok(ctx
        .user_repo()
        .find_by_ids(&ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect())
}

fn lookup<'m>(users: &'m HashMap<Snowflake, User>, id: Snowflake) -> ServiceResult<&'m User> {
    users
        .get(&id)
        .ok_or_else(|| ServiceError::internal(format!("user {id} referenced but missing")))
}

/// List view of competitions as seen by `viewer_id` at `now`
pub(crate) async fn summarize(
    ctx: &ServiceContext,
    competitions: &[Competition],
    viewer_id: Snowflake,
    now: DateTime<Utc>,
) -> ServiceResult<Vec<CompetitionSummaryResponse>> {
    let creators = users_by_id(ctx, competitions.iter().map(|c| c.creator_id)).await?;

    let mut summaries = Vec::with_capacity(competitions.len());
    for competition in competitions {
        let participant_count = ctx.competition_repo().participant_count(competition.id).await?;
        summaries.push(CompetitionSummaryResponse::new(
            competition,
            competition.status_at(now),
            lookup(&creators, competition.creator_id)?,
            participant_count,
            viewer_id,
        ));
    }
    Ok(summaries)
}

pub struct CompetitionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CompetitionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    async fn find(&self, competition_id: Snowflake) -> ServiceResult<Competition> {
        Ok(self
            .ctx
            .competition_repo()
            .find_by_id(competition_id)
            .await?
            .ok_or(DomainError::CompetitionNotFound)?)
    }

    /// Create a competition with its creator as the first participant
    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create(
        &self,
        creator_id: Snowflake,
        request: CreateCompetitionRequest,
    ) -> ServiceResult<CompetitionDetailResponse> {
        let competition = Competition::new(
            self.ctx.generate_id(),
            request.title,
            request.description,
            creator_id,
            request.start_date,
            request.end_date,
        )?;
        let creator = Participant::new(self.ctx.generate_id(), competition.id, creator_id);

        self.ctx
            .competition_repo()
            .create(&competition, &creator)
            .await?;

        info!(competition_id = %competition.id, creator_id = %creator_id, "Competition created");

        self.render_detail(&competition, creator_id, Utc::now()).await
    }

    /// Competitions the user participates in, newest first
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Snowflake) -> ServiceResult<Vec<CompetitionSummaryResponse>> {
        let competitions = self.ctx.competition_repo().list_for_user(user_id).await?;
        summarize(self.ctx, &competitions, user_id, Utc::now()).await
    }

    #[instrument(skip(self))]
    pub async fn list_active(
        &self,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<CompetitionSummaryResponse>> {
        let now = Utc::now();
        let competitions: Vec<Competition> = self
            .ctx
            .competition_repo()
            .list_for_user(user_id)
            .await?
            .into_iter()
            .filter(|c| c.status_at(now) == CompetitionStatus::Active)
            .collect();
        summarize(self.ctx, &competitions, user_id, now).await
    }

    /// Not yet over and not cancelled, soonest start first
    #[instrument(skip(self))]
    pub async fn list_future(
        &self,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<CompetitionSummaryResponse>> {
        let now = Utc::now();
        let mut competitions: Vec<Competition> = self
            .ctx
            .competition_repo()
            .list_for_user(user_id)
            .await?
            .into_iter()
            .filter(|c| c.is_future_at(now))
            .collect();
        competitions.sort_by_key(|c| (c.start_date, c.id));
        summarize(self.ctx, &competitions, user_id, now).await
    }

    /// Full view with leaderboard; participants only
    #[instrument(skip(self))]
    pub async fn detail(
        &self,
        competition_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<CompetitionDetailResponse> {
        let competition = self.find(competition_id).await?;
        self.render_detail(&competition, user_id, Utc::now()).await
    }

    #[instrument(skip(self))]
    pub async fn leave(
        &self,
        competition_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<SuccessResponse> {
        let competition = self.find(competition_id).await?;
        if competition.is_creator(user_id) {
            return Err(DomainError::CreatorCannotLeave.into());
        }

        self.ctx
            .participant_repo()
            .remove(competition_id, user_id)
            .await
            .map_err(|e| match e {
                DomainError::ParticipantNotFound => DomainError::NotParticipating,
                other => other,
            })?;

        info!(competition_id = %competition_id, user_id = %user_id, "Participant left competition");
        Ok(SuccessResponse::new(format!(
            "You have left the competition '{}'",
            competition.title
        )))
    }

    /// Creator-only override that moves the competition to `cancelled`
    #[instrument(skip(self))]
    pub async fn cancel(
        &self,
        competition_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<CompetitionDetailResponse> {
        let mut competition = self.find(competition_id).await?;
        if !competition.is_creator(user_id) {
            return Err(DomainError::CannotCancelCompetition.into());
        }
        if competition.cancelled {
            return Err(DomainError::CompetitionAlreadyCancelled.into());
        }

        self.ctx
            .competition_repo()
            .set_cancelled(competition_id, true)
            .await?;
        competition.cancelled = true;

        info!(competition_id = %competition_id, "Competition cancelled");
        self.render_detail(&competition, user_id, Utc::now()).await
    }

    async fn render_detail(
        &self,
        competition: &Competition,
        viewer_id: Snowflake,
        now: DateTime<Utc>,
    ) -> ServiceResult<CompetitionDetailResponse> {
        let participants = self
            .ctx
            .participant_repo()
            .list_by_competition(competition.id)
            .await?;
        if !participants.iter().any(|p| p.user_id == viewer_id) {
            return Err(DomainError::NoCompetitionAccess.into());
        }

        let users = users_by_id(
            self.ctx,
            participants
                .iter()
                .map(|p| p.user_id)
                .chain([competition.creator_id]),
        )
        .await?;

        let board = Leaderboard::from_participants(participants);
        let status = competition.status_at(now);
        let winner = match (status, board.leader()) {
            (CompetitionStatus::Completed, Some(leader)) => {
                Some(UserResponse::from(lookup(&users, leader.user_id)?))
            }
            _ => None,
        };

        let render = |list: &[Participant]| -> ServiceResult<Vec<ParticipantResponse>> {
            list.iter()
                .map(|p| -> ServiceResult<ParticipantResponse> {
                    Ok(ParticipantResponse::new(p, lookup(&users, p.user_id)?))
                })
                .collect()
        };
        let leaderboard = LeaderboardResponse {
            ranked: render(&board.ranked)?,
            unranked: render(&board.unranked)?,
        };
        let participants: Vec<ParticipantResponse> = leaderboard
            .ranked
            .iter()
            .chain(&leaderboard.unranked)
            .cloned()
            .collect();

        Ok(CompetitionDetailResponse {
            id: competition.id,
            title: competition.title.clone(),
            description: competition.description.clone(),
            start_date: competition.start_date,
            end_date: competition.end_date,
            status,
            creator: UserResponse::from(lookup(&users, competition.creator_id)?),
            winner,
            total_participants: participants.len(),
            participants,
            leaderboard,
            created_at: competition.created_at,
            is_creator: competition.is_creator(viewer_id),
        })
    }
}
