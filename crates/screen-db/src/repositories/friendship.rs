//! PostgreSQL implementation of FriendshipRepository
//!
//! A friendship is stored as two directed rows in `friendships`. Every path that
//! writes or removes them does so in a single transaction or statement. Sending
//! a request locks both user rows, so crossing requests cannot both be stored.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use screen_core::entities::{FriendRequest, User};
use screen_core::error::DomainError;
use screen_core::traits::{FriendshipRepository, RepoResult, RequestDelivery};
use screen_core::value_objects::Snowflake;

use crate::models::{FriendRequestModel, UserModel};

use super::error::{map_db_error, map_unique_violation};

const REQUEST_COLUMNS: &str = "id, sender_id, receiver_id, status, created_at, updated_at";

#[derive(Clone)]
pub struct PgFriendshipRepository {
    pool: PgPool,
}

impl PgFriendshipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_requests(&self, column: &str, user_id: Snowflake) -> RepoResult<Vec<FriendRequest>> {
        let rows = sqlx::query_as::<_, FriendRequestModel>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM friend_requests
             WHERE {column} = $1 AND status = 'pending'
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(FriendRequest::try_from).collect()
    }
}

#[async_trait]
impl FriendshipRepository for PgFriendshipRepository {
    #[instrument(skip(self))]
    async fn find_request(&self, id: Snowflake) -> RepoResult<Option<FriendRequest>> {
        let row = sqlx::query_as::<_, FriendRequestModel>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM friend_requests WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(FriendRequest::try_from).transpose()
    }

    #[instrument(skip(self, request), fields(request_id = %request.id))]
    async fn send_request(&self, request: &FriendRequest) -> RepoResult<RequestDelivery> {
        let sender_id = request.sender_id.into_inner();
        let receiver_id = request.receiver_id.into_inner();
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Both user rows in id order, so sends within one pair run one at a time
        let locked = sqlx::query_scalar::<_, i64>(
            r"SELECT id FROM users WHERE id IN ($1, $2) ORDER BY id FOR UPDATE",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_error)?;
        if locked.len() != 2 {
            return Err(DomainError::UserNotFound);
        }

        let (friends, already_sent) = sqlx::query_as::<_, (bool, bool)>(
            r"
            SELECT
                EXISTS(SELECT 1 FROM friendships WHERE user_id = $1 AND friend_id = $2),
                EXISTS(SELECT 1 FROM friend_requests WHERE sender_id = $1 AND receiver_id = $2)
            ",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;
        if friends {
            return Err(DomainError::AlreadyFriends);
        }
        if already_sent {
            return Err(DomainError::FriendRequestAlreadySent);
        }

        let reverse = sqlx::query_as::<_, FriendRequestModel>(&format!(
            "DELETE FROM friend_requests
             WHERE sender_id = $1 AND receiver_id = $2 AND status = 'pending'
             RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(receiver_id)
        .bind(sender_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let delivery = if let Some(reverse) = reverse {
            sqlx::query(
                r"
                INSERT INTO friendships (user_id, friend_id)
                VALUES ($1, $2), ($2, $1)
                ON CONFLICT DO NOTHING
                ",
            )
            .bind(sender_id)
            .bind(receiver_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

            RequestDelivery::AcceptedReverse(FriendRequest::try_from(reverse)?)
        } else {
            sqlx::query(
                r"
                INSERT INTO friend_requests
                    (id, sender_id, receiver_id, status, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(request.id.into_inner())
            .bind(sender_id)
            .bind(receiver_id)
            .bind(request.status.as_str())
            .bind(request.created_at)
            .bind(request.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, || DomainError::FriendRequestAlreadySent))?;

            RequestDelivery::Created
        };

        tx.commit().await.map_err(map_db_error)?;

        Ok(delivery)
    }

    #[instrument(skip(self))]
    async fn list_sent(&self, user_id: Snowflake) -> RepoResult<Vec<FriendRequest>> {
        self.list_requests("sender_id", user_id).await
    }

    #[instrument(skip(self))]
    async fn list_received(&self, user_id: Snowflake) -> RepoResult<Vec<FriendRequest>> {
        self.list_requests("receiver_id", user_id).await
    }

    #[instrument(skip(self))]
    async fn accept_request(&self, request_id: Snowflake) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let pair = sqlx::query_as::<_, (i64, i64)>(
            r"
            DELETE FROM friend_requests
            WHERE id = $1 AND status = 'pending'
            RETURNING sender_id, receiver_id
            ",
        )
        .bind(request_id.into_inner())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let Some((sender_id, receiver_id)) = pair else {
            return Err(DomainError::FriendRequestNotFound);
        };

        sqlx::query(
            r"
            INSERT INTO friendships (user_id, friend_id)
            VALUES ($1, $2), ($2, $1)
            ON CONFLICT DO NOTHING
            ",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn reject_request(&self, request_id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(
            r"DELETE FROM friend_requests WHERE id = $1 AND status = 'pending'",
        )
        .bind(request_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::FriendRequestNotFound);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn are_friends(&self, user_id: Snowflake, other_id: Snowflake) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r"SELECT EXISTS(SELECT 1 FROM friendships WHERE user_id = $1 AND friend_id = $2)",
        )
        .bind(user_id.into_inner())
        .bind(other_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn list_friends(&self, user_id: Snowflake) -> RepoResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserModel>(
            r"
            SELECT u.id, u.username, u.email, u.created_at, u.updated_at
            FROM friendships f
            JOIN users u ON u.id = f.friend_id
            WHERE f.user_id = $1
            ORDER BY u.username
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self))]
    async fn remove_friendship(
        &self,
        user_id: Snowflake,
        other_id: Snowflake,
    ) -> RepoResult<bool> {
        // One statement removes both directions atomically
        let result = sqlx::query(
            r"
            DELETE FROM friendships
            WHERE (user_id = $1 AND friend_id = $2)
               OR (user_id = $2 AND friend_id = $1)
            ",
        )
        .bind(user_id.into_inner())
        .bind(other_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
