//! PostgreSQL implementation of ParticipantRepository
//!
//! Every write that changes positions runs in a transaction that first takes
//! `SELECT ... FOR UPDATE` on the competition row, so concurrent usage updates
//! for the same competition re-rank one after another. The position uniqueness
//! constraint is deferred, which lets one `UPDATE ... FROM UNNEST` rewrite the
//! whole ranking.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use screen_core::entities::Participant;
use screen_core::error::DomainError;
use screen_core::ranking::{self, RankAssignment};
use screen_core::traits::{ParticipantRepository, RepoResult};
use screen_core::value_objects::Snowflake;

use crate::models::ParticipantModel;

use super::error::{map_db_error, map_unique_violation};

const PARTICIPANT_COLUMNS: &str =
    "id, competition_id, user_id, joined_at, position, average_daily_usage";

/// Insert a membership inside a caller-owned transaction
pub(super) async fn insert_participant(
    tx: &mut Transaction<'_, Postgres>,
    participant: &Participant,
) -> RepoResult<()> {
    sqlx::query(
        r"
        INSERT INTO competition_participants
            (id, competition_id, user_id, joined_at, position, average_daily_usage)
        VALUES ($1, $2, $3, $4, $5, $6)
        ",
    )
    .bind(participant.id.into_inner())
    .bind(participant.competition_id.into_inner())
    .bind(participant.user_id.into_inner())
    .bind(participant.joined_at)
    .bind(participant.position)
    .bind(participant.average_daily_usage)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_unique_violation(e, || DomainError::AlreadyParticipating))?;

    Ok(())
}

/// Take the per-competition ranking lock for the rest of the transaction
async fn lock_competition(conn: &mut PgConnection, competition_id: Snowflake) -> RepoResult<()> {
    sqlx::query_scalar::<_, i64>(r"SELECT id FROM competitions WHERE id = $1 FOR UPDATE")
        .bind(competition_id.into_inner())
        .fetch_optional(conn)
        .await
        .map_err(map_db_error)?
        .map(|_| ())
        .ok_or(DomainError::CompetitionNotFound)
}

async fn load_participants(
    conn: &mut PgConnection,
    competition_id: Snowflake,
) -> RepoResult<Vec<Participant>> {
    let rows = sqlx::query_as::<_, ParticipantModel>(&format!(
        "SELECT {PARTICIPANT_COLUMNS} FROM competition_participants
         WHERE competition_id = $1
         ORDER BY position NULLS LAST, id"
    ))
    .bind(competition_id.into_inner())
    .fetch_all(conn)
    .await
    .map_err(map_db_error)?;

    Ok(rows.into_iter().map(Participant::from).collect())
}

async fn write_positions(
    conn: &mut PgConnection,
    competition_id: Snowflake,
    assignments: &[RankAssignment],
) -> RepoResult<()> {
    if assignments.is_empty() {
        return Ok(());
    }

    let ids: Vec<i64> = assignments.iter().map(|a| a.participant_id.into_inner()).collect();
    let positions: Vec<i32> = assignments.iter().map(|a| a.position).collect();

    sqlx::query(
        r"
        UPDATE competition_participants AS p
        SET position = r.position
        FROM UNNEST($2::BIGINT[], $3::INTEGER[]) AS r(id, position)
        WHERE p.id = r.id AND p.competition_id = $1
        ",
    )
    .bind(competition_id.into_inner())
    .bind(ids)
    .bind(positions)
    .execute(conn)
    .await
    .map_err(map_db_error)?;

    Ok(())
}

/// Close the gaps a deleted membership leaves. The caller holds the competition lock.
pub(super) async fn compact_competition(
    conn: &mut PgConnection,
    competition_id: Snowflake,
) -> RepoResult<()> {
    let remaining = load_participants(&mut *conn, competition_id).await?;
    let assignments = ranking::compact_positions(&remaining);
    write_positions(&mut *conn, competition_id, &assignments).await
}

/// Rank, persist and return the participants sorted by their new position
async fn rerank(
    conn: &mut PgConnection,
    competition_id: Snowflake,
) -> RepoResult<Vec<Participant>> {
    let mut participants = load_participants(&mut *conn, competition_id).await?;
    let assignments = ranking::rank_participants(&participants);
    write_positions(&mut *conn, competition_id, &assignments).await?;

    ranking::apply_assignments(&mut participants, &assignments);
    participants.sort_by_key(|p| p.position);
    debug!(%competition_id, participants = participants.len(), "Competition re-ranked");
    Ok(participants)
}

#[derive(Clone)]
pub struct PgParticipantRepository {
    pool: PgPool,
}

impl PgParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantRepository for PgParticipantRepository {
    #[instrument(skip(self))]
    async fn find(
        &self,
        competition_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<Participant>> {
        let row = sqlx::query_as::<_, ParticipantModel>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM competition_participants
             WHERE competition_id = $1 AND user_id = $2"
        ))
        .bind(competition_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(Participant::from))
    }

    #[instrument(skip(self))]
    async fn list_by_competition(
        &self,
        competition_id: Snowflake,
    ) -> RepoResult<Vec<Participant>> {
        let mut conn = self.pool.acquire().await.map_err(map_db_error)?;
        load_participants(&mut conn, competition_id).await
    }

    #[instrument(skip(self))]
    async fn remove(&self, competition_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        lock_competition(&mut tx, competition_id).await?;

        let result = sqlx::query(
            r"DELETE FROM competition_participants WHERE competition_id = $1 AND user_id = $2",
        )
        .bind(competition_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ParticipantNotFound);
        }

        compact_competition(&mut tx, competition_id).await?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn record_usage(
        &self,
        competition_id: Snowflake,
        user_id: Snowflake,
        minutes: f64,
    ) -> RepoResult<Participant> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        lock_competition(&mut tx, competition_id).await?;

        let current = sqlx::query_as::<_, (i64, Option<f64>)>(
            r"
            SELECT id, average_daily_usage
            FROM competition_participants
            WHERE competition_id = $1 AND user_id = $2
            ",
        )
        .bind(competition_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let Some((participant_id, previous)) = current else {
            return Err(DomainError::ParticipantNotFound);
        };

        sqlx::query(r"UPDATE competition_participants SET average_daily_usage = $2 WHERE id = $1")
            .bind(participant_id)
            .bind(ranking::next_average(previous, minutes))
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let ranked = rerank(&mut tx, competition_id).await?;

        tx.commit().await.map_err(map_db_error)?;

        ranked
            .into_iter()
            .find(|p| p.id.into_inner() == participant_id)
            .ok_or(DomainError::ParticipantNotFound)
    }

    #[instrument(skip(self))]
    async fn recalculate(&self, competition_id: Snowflake) -> RepoResult<Vec<Participant>> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        lock_competition(&mut tx, competition_id).await?;

        let ranked = rerank(&mut tx, competition_id).await?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgParticipantRepository>();
    }
}
