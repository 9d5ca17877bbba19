//! Invitation service
//!
//! Creators invite friends into their competitions. Accepting an invitation
//! creates the participant row in the same storage transaction that marks it
//! accepted.

use chrono::{DateTime, Utc};
use screen_core::{CompetitionInvitation, DomainError, InvitationAction, Participant, Snowflake};
use tracing::{info, instrument, warn};

use crate::dto::{
    HandleInvitationRequest, InvitationHandledResponse, InvitationResponse, SendInvitationRequest,
    UserResponse,
};

use super::competition::{summarize, users_by_id};
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct InvitationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> InvitationService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Invite a friend of the creator into a competition
    #[instrument(skip(self, request))]
    pub async fn send(
        &self,
        sender_id: Snowflake,
        request: SendInvitationRequest,
    ) -> ServiceResult<InvitationResponse> {
        let (Some(competition_id), Some(username)) = (
            request.competition_id,
            request.username.filter(|u| !u.trim().is_empty()),
        ) else {
            return Err(ServiceError::validation(
                "Competition ID and receiver username are required",
            ));
        };

        let competition = self
            .ctx
            .competition_repo()
            .find_by_id(competition_id)
            .await?
            .ok_or(DomainError::CompetitionNotFound)?;
        if !competition.is_creator(sender_id) {
            return Err(DomainError::NotCompetitionCreator.into());
        }

        let receiver = self
            .ctx
            .user_repo()
            .find_by_username(username.trim())
            .await?
            .ok_or(DomainError::UserNotFound)?;

        if !self
            .ctx
            .friendship_repo()
            .are_friends(sender_id, receiver.id)
            .await?
        {
            return Err(DomainError::NotFriends.into());
        }
        if self
            .ctx
            .invitation_repo()
            .has_pending(competition_id, receiver.id)
            .await?
        {
            return Err(DomainError::AlreadyInvited.into());
        }
        if self
            .ctx
            .participant_repo()
            .find(competition_id, receiver.id)
            .await?
            .is_some()
        {
            return Err(DomainError::AlreadyParticipating.into());
        }

        let invitation = CompetitionInvitation::new(
            self.ctx.generate_id(),
            competition_id,
            sender_id,
            receiver.id,
        );
        self.ctx.invitation_repo().create(&invitation).await?;

        info!(
            invitation_id = %invitation.id,
            competition_id = %competition_id,
            receiver_id = %receiver.id,
            "Invitation sent"
        );

        let mut rendered = self.render(vec![invitation], sender_id, Utc::now()).await?;
        rendered
            .pop()
            .ok_or_else(|| ServiceError::internal("invitation vanished while rendering"))
    }

    /// Accept or decline a pending invitation addressed to the responder
    #[instrument(skip(self, request))]
    pub async fn respond(
        &self,
        responder_id: Snowflake,
        request: HandleInvitationRequest,
    ) -> ServiceResult<InvitationHandledResponse> {
        let invitation_id = request
            .invitation_id
            .ok_or_else(|| ServiceError::validation("Invitation ID is required"))?;
        let action = request
            .action
            .as_deref()
            .and_then(InvitationAction::parse)
            .ok_or_else(|| ServiceError::validation("Action must be 'accept' or 'decline'"))?;

        let pending = self
            .ctx
            .invitation_repo()
            .find_by_id(invitation_id)
            .await?
            .filter(|i| i.is_pending() && i.receiver_id == responder_id)
            .ok_or(DomainError::InvitationNotPending)?;

        let now = Utc::now();
        let competition = self
            .ctx
            .competition_repo()
            .find_by_id(pending.competition_id)
            .await?
            .ok_or(DomainError::CompetitionNotFound)?;
        if competition.status_at(now).is_terminal() {
            self.ctx.invitation_repo().expire(invitation_id).await?;
            warn!(
                invitation_id = %invitation_id,
                competition_id = %competition.id,
                "Invitation expired: competition is over"
            );
            return Err(DomainError::InvitationNotPending.into());
        }

        let invitation = match action {
            InvitationAction::Accept => {
                let participant =
                    Participant::new(self.ctx.generate_id(), competition.id, responder_id);
                self.ctx
                    .invitation_repo()
                    .accept(invitation_id, responder_id, &participant)
                    .await?
            }
            InvitationAction::Decline => {
                self.ctx
                    .invitation_repo()
                    .decline(invitation_id, responder_id)
                    .await?
            }
        };

        info!(invitation_id = %invitation_id, status = %invitation.status, "Invitation handled");

        let success = format!("Invitation {}", invitation.status);
        let invitation = self
            .render(vec![invitation], responder_id, now)
            .await?
            .pop()
            .ok_or_else(|| ServiceError::internal("invitation vanished while rendering"))?;

        Ok(InvitationHandledResponse {
            success,
            invitation,
        })
    }

    /// Pending invitations received by the user, newest first
    #[instrument(skip(self))]
    pub async fn list_pending(&self, user_id: Snowflake) -> ServiceResult<Vec<InvitationResponse>> {
        let invitations = self
            .ctx
            .invitation_repo()
            .list_pending_for_receiver(user_id)
            .await?;
        self.render(invitations, user_id, Utc::now()).await
    }

    /// Invitations the user has sent in any status, newest first
    #[instrument(skip(self))]
    pub async fn list_sent(&self, user_id: Snowflake) -> ServiceResult<Vec<InvitationResponse>> {
        let invitations = self.ctx.invitation_repo().list_by_sender(user_id).await?;
        self.render(invitations, user_id, Utc::now()).await
    }

    async fn render(
        &self,
        invitations: Vec<CompetitionInvitation>,
        viewer_id: Snowflake,
        now: DateTime<Utc>,
    ) -> ServiceResult<Vec<InvitationResponse>> {
        let mut competitions = Vec::with_capacity(invitations.len());
        for invitation in &invitations {
            competitions.push(
                self.ctx
                    .competition_repo()
                    .find_by_id(invitation.competition_id)
                    .await?
                    .ok_or(DomainError::CompetitionNotFound)?,
            );
        }
        let summaries = summarize(self.ctx, &competitions, viewer_id, now).await?;

        let users = users_by_id(
            self.ctx,
            invitations
                .iter()
                .flat_map(|i| [i.sender_id, i.receiver_id]),
        )
        .await?;
        let user = |id: Snowflake| {
            users
                .get(&id)
                .map(UserResponse::from)
                .ok_or(DomainError::UserNotFound)
        };

        invitations
            .into_iter()
            .zip(summaries)
            .map(|(invitation, competition)| -> ServiceResult<InvitationResponse> {
                Ok(InvitationResponse {
                    id: invitation.id,
                    competition,
                    sender: user(invitation.sender_id)?,
                    receiver: user(invitation.receiver_id)?,
                    status: invitation.status,
                    created_at: invitation.created_at,
                })
            })
            .collect()
    }
}
