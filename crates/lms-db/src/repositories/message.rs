//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use lms_core::entities::{ConversationSummary, Message, NewMessage};
use lms_core::traits::{MessageRepository, RepoResult};
use lms_core::value_objects::{LibraryId, UserId};

use crate::models::{ConversationModel, MessageModel};

use super::error::map_db_error;

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self, message), fields(sender_id = %message.sender_id, recipient_id = %message.recipient_id))]
    async fn create(&self, message: &NewMessage) -> RepoResult<Message> {
        let row = sqlx::query_as::<_, MessageModel>(
            r"
            INSERT INTO messages (library_id, sender_id, recipient_id, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, library_id, sender_id, recipient_id, message, is_read, created_at
            ",
        )
        .bind(message.library_id.into_inner())
        .bind(message.sender_id.into_inner())
        .bind(message.recipient_id.into_inner())
        .bind(&message.body)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn conversations(
        &self,
        library_id: LibraryId,
        user_id: UserId,
    ) -> RepoResult<Vec<ConversationSummary>> {
        let rows = sqlx::query_as::<_, ConversationModel>(
            r"
            WITH mine AS (
                SELECT m.*,
                       CASE WHEN m.sender_id = $2 THEN m.recipient_id ELSE m.sender_id END
                           AS counterpart_id
                FROM messages m
                WHERE m.library_id = $1 AND (m.sender_id = $2 OR m.recipient_id = $2)
            ),
            latest AS (
                SELECT DISTINCT ON (counterpart_id) *
                FROM mine
                ORDER BY counterpart_id, created_at DESC, id DESC
            )
            SELECT l.id, l.library_id, l.sender_id, l.recipient_id, l.message, l.is_read,
                   l.created_at, l.counterpart_id, u.full_name AS counterpart_name,
                   (SELECT COUNT(*) FROM mine x
                    WHERE x.counterpart_id = l.counterpart_id
                      AND x.recipient_id = $2 AND NOT x.is_read) AS unread_count
            FROM latest l
            JOIN users u ON u.id = l.counterpart_id
            ORDER BY l.created_at DESC, l.id DESC
            ",
        )
        .bind(library_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(ConversationSummary::from).collect())
    }

    #[instrument(skip(self))]
    async fn between(
        &self,
        library_id: LibraryId,
        user_id: UserId,
        other_id: UserId,
    ) -> RepoResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, library_id, sender_id, recipient_id, message, is_read, created_at
            FROM messages
            WHERE library_id = $1
              AND ((sender_id = $2 AND recipient_id = $3) OR (sender_id = $3 AND recipient_id = $2))
            ORDER BY created_at, id
            ",
        )
        .bind(library_id.into_inner())
        .bind(user_id.into_inner())
        .bind(other_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self))]
    async fn mark_read(
        &self,
        library_id: LibraryId,
        sender_id: UserId,
        recipient_id: UserId,
    ) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE messages SET is_read = TRUE
            WHERE library_id = $1 AND sender_id = $2 AND recipient_id = $3 AND NOT is_read
            ",
        )
        .bind(library_id.into_inner())
        .bind(sender_id.into_inner())
        .bind(recipient_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn unread_count(&self, library_id: LibraryId, user_id: UserId) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM messages
            WHERE library_id = $1 AND recipient_id = $2 AND NOT is_read
            ",
        )
        .bind(library_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
