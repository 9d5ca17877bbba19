//! Service context - dependency container for services
//!
//! Holds the repositories, the token signer and the id generator that every
//! service borrows.

use std::sync::Arc;

use screen_common::auth::JwtService;
use screen_core::traits::{
    CompetitionRepository, FriendshipRepository, InvitationRepository, ParticipantRepository,
    ProfileRepository, UserRepository,
};
use screen_core::{Snowflake, SnowflakeGenerator};
use screen_db::PgPool;

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// The pool is optional so that services can run against in-memory
/// repositories; only the readiness probe needs it.
#[derive(Clone)]
pub struct ServiceContext {
    pool: Option<PgPool>,

    user_repo: Arc<dyn UserRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
    friendship_repo: Arc<dyn FriendshipRepository>,
    competition_repo: Arc<dyn CompetitionRepository>,
    participant_repo: Arc<dyn ParticipantRepository>,
    invitation_repo: Arc<dyn InvitationRepository>,

    jwt_service: Arc<JwtService>,
    snowflake_generator: Arc<SnowflakeGenerator>,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    /// Database pool, when the context is backed by PostgreSQL
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    // === Repositories ===

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn profile_repo(&self) -> &dyn ProfileRepository {
        self.profile_repo.as_ref()
    }

    pub fn friendship_repo(&self) -> &dyn FriendshipRepository {
        self.friendship_repo.as_ref()
    }

    pub fn competition_repo(&self) -> &dyn CompetitionRepository {
        self.competition_repo.as_ref()
    }

    pub fn participant_repo(&self) -> &dyn ParticipantRepository {
        self.participant_repo.as_ref()
    }

    pub fn invitation_repo(&self) -> &dyn InvitationRepository {
        self.invitation_repo.as_ref()
    }

    // === Services ===

    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    pub fn snowflake_generator(&self) -> &SnowflakeGenerator {
        self.snowflake_generator.as_ref()
    }

    /// Mint a new record id
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("pool", &self.pool.as_ref().map(|_| "PgPool"))
            .field("repositories", &"...")
            .field("worker_id", &self.snowflake_generator.worker_id())
            .finish()
    }
}

/// Builder for creating a ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    pool: Option<PgPool>,
    user_repo: Option<Arc<dyn UserRepository>>,
    profile_repo: Option<Arc<dyn ProfileRepository>>,
    friendship_repo: Option<Arc<dyn FriendshipRepository>>,
    competition_repo: Option<Arc<dyn CompetitionRepository>>,
    participant_repo: Option<Arc<dyn ParticipantRepository>>,
    invitation_repo: Option<Arc<dyn InvitationRepository>>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire every repository to the PostgreSQL implementations over `pool`
    pub fn postgres(self, pool: PgPool) -> Self {
        use screen_db::{
            PgCompetitionRepository, PgFriendshipRepository, PgInvitationRepository,
            PgParticipantRepository, PgProfileRepository, PgUserRepository,
        };

        self.user_repo(Arc::new(PgUserRepository::new(pool.clone())))
            .profile_repo(Arc::new(PgProfileRepository::new(pool.clone())))
            .friendship_repo(Arc::new(PgFriendshipRepository::new(pool.clone())))
            .competition_repo(Arc::new(PgCompetitionRepository::new(pool.clone())))
            .participant_repo(Arc::new(PgParticipantRepository::new(pool.clone())))
            .invitation_repo(Arc::new(PgInvitationRepository::new(pool.clone())))
            .pool(pool)
    }

    pub fn pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn profile_repo(mut self, repo: Arc<dyn ProfileRepository>) -> Self {
        self.profile_repo = Some(repo);
        self
    }

    pub fn friendship_repo(mut self, repo: Arc<dyn FriendshipRepository>) -> Self {
        self.friendship_repo = Some(repo);
        self
    }

    pub fn competition_repo(mut self, repo: Arc<dyn CompetitionRepository>) -> Self {
        self.competition_repo = Some(repo);
        self
    }

    pub fn participant_repo(mut self, repo: Arc<dyn ParticipantRepository>) -> Self {
        self.participant_repo = Some(repo);
        self
    }

    pub fn invitation_repo(mut self, repo: Arc<dyn InvitationRepository>) -> Self {
        self.invitation_repo = Some(repo);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Internal` if a repository or the JWT service is
    /// missing. A missing generator defaults to worker 0.
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::internal(format!("{name} is required")))
        }

        Ok(ServiceContext {
            pool: self.pool,
            user_repo: required(self.user_repo, "user_repo")?,
            profile_repo: required(self.profile_repo, "profile_repo")?,
            friendship_repo: required(self.friendship_repo, "friendship_repo")?,
            competition_repo: required(self.competition_repo, "competition_repo")?,
            participant_repo: required(self.participant_repo, "participant_repo")?,
            invitation_repo: required(self.invitation_repo, "invitation_repo")?,
            jwt_service: required(self.jwt_service, "jwt_service")?,
            snowflake_generator: self.snowflake_generator.unwrap_or_default(),
        })
    }
}
