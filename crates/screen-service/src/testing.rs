//! In-memory repositories.
//!
//! [`MemoryStore`] implements every repository trait over a single mutex-guarded
//! state, so each call is atomic and calls on one competition are serialized the
//! same way the PostgreSQL row lock serializes them. Cascades follow the foreign
//! keys of the SQL schema.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use screen_common::auth::JwtService;
use screen_core::ranking;
use screen_core::traits::{
    CompetitionRepository, FriendshipRepository, InvitationRepository, ParticipantRepository,
    ProfileRepository, RepoResult, RequestDelivery, UserRepository,
};
use screen_core::{
    Competition, CompetitionInvitation, DomainError, FriendRequest, FriendRequestStatus,
    InvitationStatus, Participant, Profile, Snowflake, SnowflakeGenerator, User,
};

use crate::services::{ServiceContext, ServiceContextBuilder, ServiceResult};

/// Signing secret used by [`MemoryStore::context`]
pub const TEST_JWT_SECRET: &str = "memory-store-test-secret";

#[derive(Default)]
struct State {
    users: HashMap<Snowflake, User>,
    password_hashes: HashMap<Snowflake, String>,
    profiles: HashMap<Snowflake, Profile>,
    requests: HashMap<Snowflake, FriendRequest>,
    friendships: HashSet<(Snowflake, Snowflake)>,
    competitions: HashMap<Snowflake, Competition>,
    participants: HashMap<Snowflake, Participant>,
    invitations: HashMap<Snowflake, CompetitionInvitation>,
}

impl State {
    fn member(&self, competition_id: Snowflake, user_id: Snowflake) -> Option<&Participant> {
        self.participants
            .values()
            .find(|p| p.competition_id == competition_id && p.user_id == user_id)
    }

    /// Ordered like the SQL listing: by position, unpositioned last, then id
    fn members_of(&self, competition_id: Snowflake) -> Vec<Participant> {
        let mut members: Vec<Participant> = self
            .participants
            .values()
            .filter(|p| p.competition_id == competition_id)
            .cloned()
            .collect();
        members.sort_by_key(|p| (p.position.is_none(), p.position, p.id));
        members
    }

    fn insert_participant(&mut self, participant: &Participant) -> RepoResult<()> {
        if self
            .member(participant.competition_id, participant.user_id)
            .is_some()
        {
            return Err(DomainError::AlreadyParticipating);
        }
        self.participants.insert(participant.id, participant.clone());
        Ok(())
    }

    fn write_positions(&mut self, assignments: &[ranking::RankAssignment]) {
        for assignment in assignments {
            if let Some(p) = self.participants.get_mut(&assignment.participant_id) {
                p.position = Some(assignment.position);
            }
        }
    }

    fn rerank(&mut self, competition_id: Snowflake) -> Vec<Participant> {
        let members = self.members_of(competition_id);
        let assignments = ranking::rank_participants(&members);
        self.write_positions(&assignments);
        self.members_of(competition_id)
    }

    fn delete_competition(&mut self, competition_id: Snowflake) {
        self.competitions.remove(&competition_id);
        self.participants
            .retain(|_, p| p.competition_id != competition_id);
        self.invitations
            .retain(|_, i| i.competition_id != competition_id);
    }
}

/// Shared in-memory backing store. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Service context whose repositories all point at this store
    pub fn context(&self) -> ServiceResult<ServiceContext> {
        ServiceContextBuilder::new()
            .user_repo(Arc::new(self.clone()))
            .profile_repo(Arc::new(self.clone()))
            .friendship_repo(Arc::new(self.clone()))
            .competition_repo(Arc::new(self.clone()))
            .participant_repo(Arc::new(self.clone()))
            .invitation_repo(Arc::new(self.clone()))
            .jwt_service(Arc::new(JwtService::new(TEST_JWT_SECRET, 3600)))
            .snowflake_generator(Arc::new(SnowflakeGenerator::default()))
            .build()
    }

    /// Insert a competition directly, bypassing date checks on the service path.
    /// Lets tests place windows in the past.
    pub fn insert_competition(&self, competition: Competition, creator: Participant) {
        let mut state = self.state.lock();
        state.participants.insert(creator.id, creator);
        state.competitions.insert(competition.id, competition);
    }

    /// Every friendship row as `(user_id, friend_id)`
    pub fn friendship_rows(&self) -> Vec<(Snowflake, Snowflake)> {
        let mut rows: Vec<_> = self.state.lock().friendships.iter().copied().collect();
        rows.sort_unstable();
        rows
    }
}

// ============================================================================
// Users and profiles
// ============================================================================

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        Ok(self.state.lock().users.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<User>> {
        let state = self.state.lock();
        Ok(ids.iter().filter_map(|id| state.users.get(id).cloned()).collect())
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        Ok(self
            .state
            .lock()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .state
            .lock()
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn username_exists(&self, username: &str) -> RepoResult<bool> {
        Ok(self.find_by_username(username).await?.is_some())
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn create(&self, user: &User, profile: &Profile, password_hash: &str) -> RepoResult<()> {
        let mut state = self.state.lock();
        if state.users.values().any(|u| u.username == user.username) {
            return Err(DomainError::UsernameAlreadyExists);
        }
        if state.users.values().any(|u| u.email == user.email) {
            return Err(DomainError::EmailAlreadyExists);
        }
        state.users.insert(user.id, user.clone());
        state
            .password_hashes
            .insert(user.id, password_hash.to_string());
        state.profiles.insert(user.id, profile.clone());
        Ok(())
    }

    async fn update_username(&self, id: Snowflake, username: &str) -> RepoResult<()> {
        let mut state = self.state.lock();
        if state
            .users
            .values()
            .any(|u| u.id != id && u.username == username)
        {
            return Err(DomainError::UsernameAlreadyExists);
        }
        let user = state.users.get_mut(&id).ok_or(DomainError::UserNotFound)?;
        user.username = username.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let mut state = self.state.lock();
        if state.users.remove(&id).is_none() {
            return Err(DomainError::UserNotFound);
        }
        state.password_hashes.remove(&id);
        state.profiles.remove(&id);
        state
            .requests
            .retain(|_, r| r.sender_id != id && r.receiver_id != id);
        state.friendships.retain(|(a, b)| *a != id && *b != id);

        let created: Vec<Snowflake> = state
            .competitions
            .values()
            .filter(|c| c.creator_id == id)
            .map(|c| c.id)
            .collect();
        for competition_id in created {
            state.delete_competition(competition_id);
        }

        let joined: Vec<Snowflake> = state
            .participants
            .values()
            .filter(|p| p.user_id == id)
            .map(|p| p.competition_id)
            .collect();
        state.participants.retain(|_, p| p.user_id != id);
        for competition_id in joined {
            let remaining = state.members_of(competition_id);
            let assignments = ranking::compact_positions(&remaining);
            state.write_positions(&assignments);
        }
        state
            .invitations
            .retain(|_, i| i.sender_id != id && i.receiver_id != id);
        Ok(())
    }

    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>> {
        Ok(self.state.lock().password_hashes.get(&id).cloned())
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Option<Profile>> {
        Ok(self.state.lock().profiles.get(&user_id).cloned())
    }

    async fn update(&self, profile: &Profile) -> RepoResult<()> {
        let mut state = self.state.lock();
        let stored = state
            .profiles
            .get_mut(&profile.user_id)
            .ok_or(DomainError::UserNotFound)?;
        // The usage counter is only moved by add_screen_time
        let total = stored.total_screen_time;
        *stored = profile.clone();
        stored.total_screen_time = total;
        Ok(())
    }

    async fn add_screen_time(&self, user_id: Snowflake, minutes: f64) -> RepoResult<()> {
        let mut state = self.state.lock();
        let profile = state
            .profiles
            .get_mut(&user_id)
            .ok_or(DomainError::UserNotFound)?;
        profile.total_screen_time += minutes;
        Ok(())
    }
}

// ============================================================================
// Friendships
// ============================================================================

fn newest_first_requests(mut requests: Vec<FriendRequest>) -> Vec<FriendRequest> {
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    requests
}

#[async_trait]
impl FriendshipRepository for MemoryStore {
    async fn find_request(&self, id: Snowflake) -> RepoResult<Option<FriendRequest>> {
        Ok(self.state.lock().requests.get(&id).cloned())
    }

    async fn send_request(&self, request: &FriendRequest) -> RepoResult<RequestDelivery> {
        let mut state = self.state.lock();
        let (sender, receiver) = (request.sender_id, request.receiver_id);
        if !state.users.contains_key(&sender) || !state.users.contains_key(&receiver) {
            return Err(DomainError::UserNotFound);
        }
        if state.friendships.contains(&(sender, receiver)) {
            return Err(DomainError::AlreadyFriends);
        }
        if state
            .requests
            .values()
            .any(|r| r.sender_id == sender && r.receiver_id == receiver)
        {
            return Err(DomainError::FriendRequestAlreadySent);
        }

        let reverse = state
            .requests
            .values()
            .find(|r| r.sender_id == receiver && r.receiver_id == sender && r.is_pending())
            .map(|r| r.id);
        if let Some(reverse_id) = reverse {
            let accepted = state
                .requests
                .remove(&reverse_id)
                .ok_or(DomainError::FriendRequestNotFound)?;
            state.friendships.insert((sender, receiver));
            state.friendships.insert((receiver, sender));
            return Ok(RequestDelivery::AcceptedReverse(accepted));
        }

        state.requests.insert(request.id, request.clone());
        Ok(RequestDelivery::Created)
    }

    async fn list_sent(&self, user_id: Snowflake) -> RepoResult<Vec<FriendRequest>> {
        let sent = self
            .state
            .lock()
            .requests
            .values()
            .filter(|r| r.sender_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first_requests(sent))
    }

    async fn list_received(&self, user_id: Snowflake) -> RepoResult<Vec<FriendRequest>> {
        let received = self
            .state
            .lock()
            .requests
            .values()
            .filter(|r| r.receiver_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first_requests(received))
    }

    async fn accept_request(&self, request_id: Snowflake) -> RepoResult<()> {
        let mut state = self.state.lock();
        let request = match state.requests.get(&request_id) {
            Some(r) if r.status == FriendRequestStatus::Pending => r.clone(),
            _ => return Err(DomainError::FriendRequestNotFound),
        };
        state.requests.remove(&request_id);
        state
            .friendships
            .insert((request.sender_id, request.receiver_id));
        state
            .friendships
            .insert((request.receiver_id, request.sender_id));
        Ok(())
    }

    async fn reject_request(&self, request_id: Snowflake) -> RepoResult<()> {
        let mut state = self.state.lock();
        match state.requests.get(&request_id) {
            Some(r) if r.status == FriendRequestStatus::Pending => {
                state.requests.remove(&request_id);
                Ok(())
            }
            _ => Err(DomainError::FriendRequestNotFound),
        }
    }

    async fn are_friends(&self, user_id: Snowflake, other_id: Snowflake) -> RepoResult<bool> {
        Ok(self.state.lock().friendships.contains(&(user_id, other_id)))
    }

    async fn list_friends(&self, user_id: Snowflake) -> RepoResult<Vec<User>> {
        let state = self.state.lock();
        let mut friends: Vec<User> = state
            .friendships
            .iter()
            .filter(|(a, _)| *a == user_id)
            .filter_map(|(_, b)| state.users.get(b).cloned())
            .collect();
        friends.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(friends)
    }

    async fn remove_friendship(
        &self,
        user_id: Snowflake,
        other_id: Snowflake,
    ) -> RepoResult<bool> {
        let mut state = self.state.lock();
        let forward = state.friendships.remove(&(user_id, other_id));
        let backward = state.friendships.remove(&(other_id, user_id));
        Ok(forward || backward)
    }
}

// ============================================================================
// Competitions and participants
// ============================================================================

#[async_trait]
impl CompetitionRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Competition>> {
        Ok(self.state.lock().competitions.get(&id).cloned())
    }

    async fn create(&self, competition: &Competition, creator: &Participant) -> RepoResult<()> {
        let mut state = self.state.lock();
        state
            .competitions
            .insert(competition.id, competition.clone());
        state.insert_participant(creator)
    }

    async fn list_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Competition>> {
        let state = self.state.lock();
        let mut competitions: Vec<Competition> = state
            .competitions
            .values()
            .filter(|c| state.member(c.id, user_id).is_some())
            .cloned()
            .collect();
        competitions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(competitions)
    }

    async fn list_running_for_user(
        &self,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<Vec<Competition>> {
        let state = self.state.lock();
        let mut competitions: Vec<Competition> = state
            .competitions
            .values()
            .filter(|c| c.is_running_at(at) && state.member(c.id, user_id).is_some())
            .cloned()
            .collect();
        competitions.sort_by_key(|c| (c.start_date, c.id));
        Ok(competitions)
    }

    async fn set_cancelled(&self, id: Snowflake, cancelled: bool) -> RepoResult<()> {
        let mut state = self.state.lock();
        let competition = state
            .competitions
            .get_mut(&id)
            .ok_or(DomainError::CompetitionNotFound)?;
        competition.cancelled = cancelled;
        Ok(())
    }

    async fn participant_count(&self, id: Snowflake) -> RepoResult<i64> {
        let state = self.state.lock();
        Ok(state
            .participants
            .values()
            .filter(|p| p.competition_id == id)
            .count() as i64)
    }
}

#[async_trait]
impl ParticipantRepository for MemoryStore {
    async fn find(
        &self,
        competition_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<Participant>> {
        Ok(self.state.lock().member(competition_id, user_id).cloned())
    }

    async fn list_by_competition(
        &self,
        competition_id: Snowflake,
    ) -> RepoResult<Vec<Participant>> {
        Ok(self.state.lock().members_of(competition_id))
    }

    async fn remove(&self, competition_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        let mut state = self.state.lock();
        let participant_id = state
            .member(competition_id, user_id)
            .map(|p| p.id)
            .ok_or(DomainError::ParticipantNotFound)?;
        state.participants.remove(&participant_id);

        let remaining = state.members_of(competition_id);
        let assignments = ranking::compact_positions(&remaining);
        state.write_positions(&assignments);
        Ok(())
    }

    async fn record_usage(
        &self,
        competition_id: Snowflake,
        user_id: Snowflake,
        minutes: f64,
    ) -> RepoResult<Participant> {
        let mut state = self.state.lock();
        let participant_id = {
            let participant = state
                .participants
                .values_mut()
                .find(|p| p.competition_id == competition_id && p.user_id == user_id)
                .ok_or(DomainError::ParticipantNotFound)?;
            participant.average_daily_usage =
                Some(ranking::next_average(participant.average_daily_usage, minutes));
            participant.id
        };

        state
            .rerank(competition_id)
            .into_iter()
            .find(|p| p.id == participant_id)
            .ok_or(DomainError::ParticipantNotFound)
    }

    async fn recalculate(&self, competition_id: Snowflake) -> RepoResult<Vec<Participant>> {
        Ok(self.state.lock().rerank(competition_id))
    }
}

// ============================================================================
// Invitations
// ============================================================================

#[async_trait]
impl InvitationRepository for MemoryStore {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<CompetitionInvitation>> {
        Ok(self.state.lock().invitations.get(&id).cloned())
    }

    async fn has_pending(
        &self,
        competition_id: Snowflake,
        receiver_id: Snowflake,
    ) -> RepoResult<bool> {
        Ok(self.state.lock().invitations.values().any(|i| {
            i.competition_id == competition_id && i.receiver_id == receiver_id && i.is_pending()
        }))
    }

    async fn create(&self, invitation: &CompetitionInvitation) -> RepoResult<()> {
        let mut state = self.state.lock();
        if state.invitations.values().any(|i| {
            i.competition_id == invitation.competition_id
                && i.receiver_id == invitation.receiver_id
                && i.is_pending()
        }) {
            return Err(DomainError::AlreadyInvited);
        }
        state.invitations.insert(invitation.id, invitation.clone());
        Ok(())
    }

    async fn list_pending_for_receiver(
        &self,
        receiver_id: Snowflake,
    ) -> RepoResult<Vec<CompetitionInvitation>> {
        let mut pending: Vec<CompetitionInvitation> = self
            .state
            .lock()
            .invitations
            .values()
            .filter(|i| i.receiver_id == receiver_id && i.is_pending())
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(pending)
    }

    async fn list_by_sender(&self, sender_id: Snowflake) -> RepoResult<Vec<CompetitionInvitation>> {
        let mut sent: Vec<CompetitionInvitation> = self
            .state
            .lock()
            .invitations
            .values()
            .filter(|i| i.sender_id == sender_id)
            .cloned()
            .collect();
        sent.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(sent)
    }

    async fn accept(
        &self,
        invitation_id: Snowflake,
        receiver_id: Snowflake,
        participant: &Participant,
    ) -> RepoResult<CompetitionInvitation> {
        let mut state = self.state.lock();
        match state.invitations.get(&invitation_id) {
            Some(i) if i.receiver_id == receiver_id && i.is_pending() => {}
            _ => return Err(DomainError::InvitationNotPending),
        }
        state.insert_participant(participant)?;

        let invitation = state
            .invitations
            .get_mut(&invitation_id)
            .ok_or(DomainError::InvitationNotPending)?;
        invitation.status = InvitationStatus::Accepted;
        invitation.updated_at = Utc::now();
        Ok(invitation.clone())
    }

    async fn decline(
        &self,
        invitation_id: Snowflake,
        receiver_id: Snowflake,
    ) -> RepoResult<CompetitionInvitation> {
        let mut state = self.state.lock();
        match state.invitations.get_mut(&invitation_id) {
            Some(i) if i.receiver_id == receiver_id && i.is_pending() => {
                i.status = InvitationStatus::Declined;
                i.updated_at = Utc::now();
                Ok(i.clone())
            }
            _ => Err(DomainError::InvitationNotPending),
        }
    }

    async fn expire(&self, invitation_id: Snowflake) -> RepoResult<()> {
        let mut state = self.state.lock();
        if let Some(i) = state.invitations.get_mut(&invitation_id) {
            if i.is_pending() {
                i.status = InvitationStatus::Expired;
                i.updated_at = Utc::now();
            }
        }
        Ok(())
    }
}
