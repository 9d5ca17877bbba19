//! # screen-db
//!
//! PostgreSQL implementations of the repository traits defined in `screen-core`:
//!
//! - Connection pool management and schema migrations
//! - Database models with SQLx `FromRow` derives
//! - Model -> entity mappers
//! - Repository implementations, including the per-competition ranking lock
//!
//! ## Usage
//!
//! ```rust,ignore
//! use screen_db::{create_pool, run_migrations, PgUserRepository};
//!
//! let pool = create_pool(&config.database).await?;
//! run_migrations(&pool).await?;
//! let users = PgUserRepository::new(pool.clone());
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, run_migrations_from, PgPool, PoolError};
pub use repositories::{
    PgCompetitionRepository, PgFriendshipRepository, PgInvitationRepository,
    PgParticipantRepository, PgProfileRepository, PgUserRepository,
};
