//! PostgreSQL implementation of CompetitionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use screen_core::entities::{Competition, Participant};
use screen_core::error::DomainError;
use screen_core::traits::{CompetitionRepository, RepoResult};
use screen_core::value_objects::Snowflake;

use crate::models::CompetitionModel;

use super::error::map_db_error;
use super::participant::insert_participant;

#[derive(Clone)]
pub struct PgCompetitionRepository {
    pool: PgPool,
}

impl PgCompetitionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompetitionRepository for PgCompetitionRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Competition>> {
        let result = sqlx::query_as::<_, CompetitionModel>(
            r"
            SELECT id, title, description, creator_id, start_date, end_date, cancelled, created_at
            FROM competitions
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Competition::from))
    }

    #[instrument(skip(self, competition, creator), fields(competition_id = %competition.id))]
    async fn create(&self, competition: &Competition, creator: &Participant) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO competitions (id, title, description, creator_id, start_date, end_date,
                                      cancelled, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(competition.id.into_inner())
        .bind(&competition.title)
        .bind(&competition.description)
        .bind(competition.creator_id.into_inner())
        .bind(competition.start_date)
        .bind(competition.end_date)
        .bind(competition.cancelled)
        .bind(competition.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        insert_participant(&mut tx, creator).await?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_for_user(&self, user_id: Snowflake) -> RepoResult<Vec<Competition>> {
        let results = sqlx::query_as::<_, CompetitionModel>(
            r"
            SELECT c.id, c.title, c.description, c.creator_id, c.start_date, c.end_date,
                   c.cancelled, c.created_at
            FROM competitions c
            JOIN competition_participants p ON p.competition_id = c.id
            WHERE p.user_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Competition::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_running_for_user(
        &self,
        user_id: Snowflake,
        at: DateTime<Utc>,
    ) -> RepoResult<Vec<Competition>> {
        let results = sqlx::query_as::<_, CompetitionModel>(
            r"
            SELECT c.id, c.title, c.description, c.creator_id, c.start_date, c.end_date,
                   c.cancelled, c.created_at
            FROM competitions c
            JOIN competition_participants p ON p.competition_id = c.id
            WHERE p.user_id = $1 AND c.start_date <= $2 AND c.end_date > $2
            ORDER BY c.start_date, c.id
            ",
        )
        .bind(user_id.into_inner())
        .bind(at)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Competition::from).collect())
    }

    #[instrument(skip(self))]
    async fn set_cancelled(&self, id: Snowflake, cancelled: bool) -> RepoResult<()> {
        let result = sqlx::query(r"UPDATE competitions SET cancelled = $2 WHERE id = $1")
            .bind(id.into_inner())
            .bind(cancelled)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::CompetitionNotFound);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn participant_count(&self, id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r"SELECT COUNT(*) FROM competition_participants WHERE competition_id = $1",
        )
        .bind(id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
