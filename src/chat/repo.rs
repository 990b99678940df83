use sqlx::PgPool;
use time::OffsetDateTime;

use crate::chat::repo_types::{ChatMessage, Contact};

const MESSAGE_COLUMNS: &str =
    r#"id, sender_id, receiver_id, message, "timestamp", created_at, updated_at, deleted_at"#;

impl ChatMessage {
    pub async fn create(
        db: &PgPool,
        sender_id: &str,
        receiver_id: &str,
        message: &str,
        timestamp: OffsetDateTime,
    ) -> sqlx::Result<ChatMessage> {
        sqlx::query_as::<_, ChatMessage>(&format!(
            r#"
            INSERT INTO chat_messages (sender_id, receiver_id, message, "timestamp")
            VALUES ($1, $2, $3, $4)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(sender_id)
        .bind(receiver_id)
        .bind(message)
        .bind(timestamp)
        .fetch_one(db)
        .await
    }

    /// Both directions of the conversation, oldest first.
    pub async fn history(db: &PgPool, a: &str, b: &str) -> sqlx::Result<Vec<ChatMessage>> {
        sqlx::query_as::<_, ChatMessage>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM chat_messages
            WHERE ((sender_id = $1 AND receiver_id = $2)
                OR (sender_id = $2 AND receiver_id = $1))
              AND deleted_at IS NULL
            ORDER BY "timestamp" ASC, id ASC
            "#
        ))
        .bind(a)
        .bind(b)
        .fetch_all(db)
        .await
    }
}

impl Contact {
    /// Registered users that exchanged at least one message with `username`.
    pub async fn list_for(db: &PgPool, username: &str) -> sqlx::Result<Vec<Contact>> {
        sqlx::query_as::<_, Contact>(
            r#"
            SELECT DISTINCT u.username
            FROM users u
            JOIN chat_messages m
              ON (u.username = m.sender_id OR u.username = m.receiver_id)
            WHERE (m.sender_id = $1 OR m.receiver_id = $1)
              AND u.username <> $1
              AND m.deleted_at IS NULL
              AND u.deleted_at IS NULL
            ORDER BY u.username
            "#,
        )
        .bind(username)
        .fetch_all(db)
        .await
    }
}
