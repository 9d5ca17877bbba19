//! PostgreSQL implementation of InvitationRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use screen_core::entities::{CompetitionInvitation, Participant};
use screen_core::error::DomainError;
use screen_core::traits::{InvitationRepository, RepoResult};
use screen_core::value_objects::Snowflake;

use crate::models::InvitationModel;

use super::error::{map_db_error, map_unique_violation};
use super::participant::insert_participant;

const INVITATION_COLUMNS: &str =
    "id, competition_id, sender_id, receiver_id, status, created_at, updated_at";

#[derive(Clone)]
pub struct PgInvitationRepository {
    pool: PgPool,
}

impl PgInvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationRepository for PgInvitationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<CompetitionInvitation>> {
        let row = sqlx::query_as::<_, InvitationModel>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM competition_invitations WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(CompetitionInvitation::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn has_pending(
        &self,
        competition_id: Snowflake,
        receiver_id: Snowflake,
    ) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(
                SELECT 1 FROM competition_invitations
                WHERE competition_id = $1 AND receiver_id = $2 AND status = 'pending'
            )
            ",
        )
        .bind(competition_id.into_inner())
        .bind(receiver_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, invitation), fields(invitation_id = %invitation.id))]
    async fn create(&self, invitation: &CompetitionInvitation) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO competition_invitations
                (id, competition_id, sender_id, receiver_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(invitation.id.into_inner())
        .bind(invitation.competition_id.into_inner())
        .bind(invitation.sender_id.into_inner())
        .bind(invitation.receiver_id.into_inner())
        .bind(invitation.status.as_str())
        .bind(invitation.created_at)
        .bind(invitation.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyInvited))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_pending_for_receiver(
        &self,
        receiver_id: Snowflake,
    ) -> RepoResult<Vec<CompetitionInvitation>> {
        let rows = sqlx::query_as::<_, InvitationModel>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM competition_invitations
             WHERE receiver_id = $1 AND status = 'pending'
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(receiver_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(CompetitionInvitation::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn list_by_sender(&self, sender_id: Snowflake) -> RepoResult<Vec<CompetitionInvitation>> {
        let rows = sqlx::query_as::<_, InvitationModel>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM competition_invitations
             WHERE sender_id = $1
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(sender_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(CompetitionInvitation::try_from).collect()
    }

    #[instrument(skip(self, participant))]
    async fn accept(
        &self,
        invitation_id: Snowflake,
        receiver_id: Snowflake,
        participant: &Participant,
    ) -> RepoResult<CompetitionInvitation> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // The status guard makes a second response find nothing
        let row = sqlx::query_as::<_, InvitationModel>(&format!(
            "UPDATE competition_invitations
             SET status = 'accepted', updated_at = NOW()
             WHERE id = $1 AND receiver_id = $2 AND status = 'pending'
             RETURNING {INVITATION_COLUMNS}"
        ))
        .bind(invitation_id.into_inner())
        .bind(receiver_id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .ok_or(DomainError::InvitationNotPending)?;

        insert_participant(&mut tx, participant).await?;

        tx.commit().await.map_err(map_db_error)?;

        CompetitionInvitation::try_from(row)
    }

    #[instrument(skip(self))]
    async fn decline(
        &self,
        invitation_id: Snowflake,
        receiver_id: Snowflake,
    ) -> RepoResult<CompetitionInvitation> {
        let row = sqlx::query_as::<_, InvitationModel>(&format!(
            "UPDATE competition_invitations
             SET status = 'declined', updated_at = NOW()
             WHERE id = $1 AND receiver_id = $2 AND status = 'pending'
             RETURNING {INVITATION_COLUMNS}"
        ))
        .bind(invitation_id.into_inner())
        .bind(receiver_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or(DomainError::InvitationNotPending)?;

        CompetitionInvitation::try_from(row)
    }

    #[instrument(skip(self))]
    async fn expire(&self, invitation_id: Snowflake) -> RepoResult<()> {
        sqlx::query(
            r"
            UPDATE competition_invitations
            SET status = 'expired', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            ",
        )
        .bind(invitation_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgInvitationRepository>();
    }
}
