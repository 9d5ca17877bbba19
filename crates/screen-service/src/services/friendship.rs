//! Friendship service
//!
//! The request workflow (send, auto-accept, respond) and the symmetric friend
//! set. Storage applies both directions of a friendship in one transaction.

use std::collections::HashMap;

use screen_core::{
    DomainError, FriendRequest, FriendRequestAction, RequestDelivery, Snowflake, User,
};
use tracing::{info, instrument};

use crate::dto::{
    DeleteFriendRequest, FriendRequestsResponse, HandleFriendRequestRequest,
    ReceivedRequestResponse, SendFriendRequestRequest, SentRequestResponse, SuccessResponse,
    UserResponse, UserSummary,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Result of `send_request`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FriendRequestOutcome {
    /// A new pending request was stored
    Sent(SuccessResponse),
    /// The receiver had already asked; their request was accepted instead
    AutoAccepted(SuccessResponse),
}

impl FriendRequestOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Sent(_))
    }

    pub fn into_body(self) -> SuccessResponse {
        match self {
            Self::Sent(body) | Self::AutoAccepted(body) => body,
        }
    }
}

pub struct FriendshipService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> FriendshipService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, request))]
    pub async fn send_request(
        &self,
        sender_id: Snowflake,
        request: SendFriendRequestRequest,
    ) -> ServiceResult<FriendRequestOutcome> {
        let username = request
            .username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty());

        let receiver = match (username, request.user_id) {
            (Some(username), _) => self.ctx.user_repo().find_by_username(username).await?,
            (None, Some(user_id)) => self.ctx.user_repo().find_by_id(user_id).await?,
            (None, None) => {
                return Err(ServiceError::validation("Username or user ID is required"))
            }
        }
        .ok_or(DomainError::UserNotFound)?;

        if receiver.id == sender_id {
            return Err(DomainError::CannotFriendSelf.into());
        }

        let friend_request = FriendRequest::new(self.ctx.generate_id(), sender_id, receiver.id);
        match self
            .ctx
            .friendship_repo()
            .send_request(&friend_request)
            .await?
        {
            RequestDelivery::AcceptedReverse(reverse) => {
                info!(request_id = %reverse.id, "Reverse friend request auto-accepted");
                Ok(FriendRequestOutcome::AutoAccepted(SuccessResponse::new(
                    format!("Friend request from {} was accepted", receiver.username),
                )))
            }
            RequestDelivery::Created => {
                info!(request_id = %friend_request.id, receiver_id = %receiver.id, "Friend request sent");
                Ok(FriendRequestOutcome::Sent(SuccessResponse::new(format!(
                    "Friend request sent to {}",
                    receiver.username
                ))))
            }
        }
    }

    /// Accept or reject a pending request addressed to `responder_id`
    #[instrument(skip(self, request))]
    pub async fn respond(
        &self,
        responder_id: Snowflake,
        request: HandleFriendRequestRequest,
    ) -> ServiceResult<SuccessResponse> {
        let request_id = request
            .request_id
            .ok_or_else(|| ServiceError::validation("Request ID is required"))?;
        let action = request
            .action
            .as_deref()
            .and_then(FriendRequestAction::parse)
            .ok_or_else(|| {
                ServiceError::validation(r#"Action must be either "accept" or "reject""#)
            })?;

        let friend_request = self
            .ctx
            .friendship_repo()
            .find_request(request_id)
            .await?
            .filter(|r| r.is_pending() && r.receiver_id == responder_id)
            .ok_or(DomainError::FriendRequestNotFound)?;

        let sender = self
            .ctx
            .user_repo()
            .find_by_id(friend_request.sender_id)
            .await?
            .ok_or(DomainError::FriendRequestNotFound)?;

        match action {
            FriendRequestAction::Accept => {
                self.ctx.friendship_repo().accept_request(request_id).await?;
            }
            FriendRequestAction::Reject => {
                self.ctx.friendship_repo().reject_request(request_id).await?;
            }
        }

        info!(request_id = %request_id, action = action.past_tense(), "Friend request handled");
        Ok(SuccessResponse::new(format!(
            "Friend request from {} {}",
            sender.username,
            action.past_tense()
        )))
    }

    #[instrument(skip(self))]
    pub async fn list_requests(&self, user_id: Snowflake) -> ServiceResult<FriendRequestsResponse> {
        let sent = self.ctx.friendship_repo().list_sent(user_id).await?;
        let received = self.ctx.friendship_repo().list_received(user_id).await?;

        let ids: Vec<Snowflake> = sent
            .iter()
            .map(|r| r.receiver_id)
            .chain(received.iter().map(|r| r.sender_id))
            .collect();
        let users: HashMap<Snowflake, User> = self
            .ctx
            .user_repo()
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let sent_requests = sent
            .iter()
            .filter_map(|r| {
                users.get(&r.receiver_id).map(|receiver| SentRequestResponse {
                    id: r.id,
                    receiver: UserSummary::from(receiver),
                    status: r.status,
                    created_at: r.created_at,
                })
            })
            .collect();
        let received_requests = received
            .iter()
            .filter_map(|r| {
                users.get(&r.sender_id).map(|sender| ReceivedRequestResponse {
                    id: r.id,
                    sender: UserSummary::from(sender),
                    status: r.status,
                    created_at: r.created_at,
                })
            })
            .collect();

        Ok(FriendRequestsResponse {
            sent_requests,
            received_requests,
        })
    }

    #[instrument(skip(self))]
    pub async fn list_friends(&self, user_id: Snowflake) -> ServiceResult<Vec<UserResponse>> {
        let friends = self.ctx.friendship_repo().list_friends(user_id).await?;
        Ok(friends.iter().map(UserResponse::from).collect())
    }

    pub async fn are_friends(&self, user_id: Snowflake, other_id: Snowflake) -> ServiceResult<bool> {
        Ok(self
            .ctx
            .friendship_repo()
            .are_friends(user_id, other_id)
            .await?)
    }

    /// Remove both directions of a friendship
    #[instrument(skip(self, request))]
    pub async fn delete_friendship(
        &self,
        user_id: Snowflake,
        request: DeleteFriendRequest,
    ) -> ServiceResult<SuccessResponse> {
        let friend_id = request
            .friend_id
            .ok_or_else(|| ServiceError::validation("Friend ID is required"))?;

        let friend = self
            .ctx
            .user_repo()
            .find_by_id(friend_id)
            .await?
            .ok_or(DomainError::FriendshipNotFound)?;

        if !self
            .ctx
            .friendship_repo()
            .remove_friendship(user_id, friend_id)
            .await?
        {
            return Err(DomainError::FriendshipNotFound.into());
        }

        info!(friend_id = %friend_id, "Friendship removed");
        Ok(SuccessResponse::new(format!(
            "Removed {} from friends",
            friend.username
        )))
    }
}
