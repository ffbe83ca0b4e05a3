//! Direct conversations and their messages.

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::entities::{
    new_id, parse_enum, timestamp_now, Conversation, Message, MessageType, UserSummary,
};
use crate::types::{DatabaseError, DatabaseResult};

const MESSAGE_COLUMNS: &str =
    "id, conversation_id, sender_id, content, message_type, is_read, created_at, updated_at";

#[derive(Clone)]
pub struct ConversationRepository {
    pool: SqlitePool,
}

impl ConversationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns the conversation between two users, creating it on first use.
    ///
    /// The sorted pair is unique, so concurrent callers end up sharing one
    /// conversation. The flag is true when this call created it.
    pub async fn open_between(
        &self,
        first: &str,
        second: &str,
    ) -> DatabaseResult<(Conversation, bool)> {
        let key = pair_key(first, second);
        let now = timestamp_now();
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query(
            "INSERT OR IGNORE INTO conversations (id, pair_key, last_message_id, created_at, updated_at)
             VALUES (?, ?, NULL, ?, ?)",
        )
        .bind(new_id())
        .bind(&key)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        let id: String = sqlx::query_scalar("SELECT id FROM conversations WHERE pair_key = ?")
            .bind(&key)
            .fetch_one(&mut *tx)
            .await?;

        if created {
            for user_id in [first, second] {
                sqlx::query(
                    "INSERT OR IGNORE INTO conversation_participants (conversation_id, user_id)
                     VALUES (?, ?)",
                )
                .bind(&id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        let conversation = self
            .find_by_id(&id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("conversation {id}")))?;
        Ok((conversation, created))
    }

    pub async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<Conversation>> {
        let row = sqlx::query(
            "SELECT id, last_message_id, created_at, updated_at FROM conversations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(&row).await?)),
            None => Ok(None),
        }
    }

    /// The user's conversations, most recently active first.
    pub async fn list_for_user(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Conversation>> {
        let rows = sqlx::query(
            "SELECT c.id, c.last_message_id, c.created_at, c.updated_at
             FROM conversations c
             JOIN conversation_participants cp ON cp.conversation_id = c.id
             WHERE cp.user_id = ?
             ORDER BY c.updated_at DESC, c.rowid DESC
             LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut conversations = Vec::with_capacity(rows.len());
        for row in &rows {
            conversations.push(self.hydrate(row).await?);
        }
        Ok(conversations)
    }

    pub async fn count_for_user(&self, user_id: &str) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM conversation_participants WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// A page of messages, newest first.
    pub async fn list_messages(
        &self,
        conversation_id: &str,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Message>> {
        let rows = sqlx::query(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE conversation_id = ?
             ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?"
        ))
        .bind(conversation_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_message).collect()
    }

    pub async fn count_messages(&self, conversation_id: &str) -> DatabaseResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE conversation_id = ?")
            .bind(conversation_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Stores a message and makes it the conversation's last message.
    pub async fn insert_message(
        &self,
        conversation_id: &str,
        sender_id: &str,
        content: &str,
        message_type: MessageType,
    ) -> DatabaseResult<Message> {
        let id = new_id();
        let now = timestamp_now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO messages (id, conversation_id, sender_id, content, message_type, is_read,
                                   created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(&id)
        .bind(conversation_id)
        .bind(sender_id)
        .bind(content)
        .bind(message_type.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE conversations SET last_message_id = ?, updated_at = ? WHERE id = ?")
            .bind(&id)
            .bind(&now)
            .bind(conversation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.find_message(&id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("message {id}")))
    }

    async fn find_message(&self, id: &str) -> DatabaseResult<Option<Message>> {
        let row = sqlx::query(&format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_message).transpose()
    }

    async fn hydrate(&self, row: &SqliteRow) -> DatabaseResult<Conversation> {
        let id: String = row.try_get("id")?;
        let last_message_id: Option<String> = row.try_get("last_message_id")?;

        let participant_rows = sqlx::query(
            "SELECT u.id, u.name, u.email, u.avatar
             FROM conversation_participants cp
             JOIN users u ON u.id = cp.user_id
             WHERE cp.conversation_id = ?
             ORDER BY u.name ASC",
        )
        .bind(&id)
        .fetch_all(&self.pool)
        .await?;

        let participants = participant_rows
            .iter()
            .map(|row| {
                Ok(UserSummary {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    email: row.try_get("email")?,
                    avatar: row.try_get("avatar")?,
                })
            })
            .collect::<DatabaseResult<Vec<_>>>()?;

        let last_message = match last_message_id {
            Some(message_id) => self.find_message(&message_id).await?,
            None => None,
        };

        Ok(Conversation {
            id,
            participants,
            last_message,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

fn map_message(row: &SqliteRow) -> DatabaseResult<Message> {
    let message_type: String = row.try_get("message_type")?;
    Ok(Message {
        id: row.try_get("id")?,
        conversation_id: row.try_get("conversation_id")?,
        sender_id: row.try_get("sender_id")?,
        content: row.try_get("content")?,
        message_type: parse_enum("message_type", &message_type)?,
        is_read: row.try_get("is_read")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn pair_key(first: &str, second: &str) -> String {
    if first <= second {
        format!("{first}:{second}")
    } else {
        format!("{second}:{first}")
    }
}

#[cfg(test)]
mod tests {
    use super::pair_key;

    #[test]
    fn pair_key_ignores_argument_order() {
        assert_eq!(pair_key("bob", "alice"), "alice:bob");
        assert_eq!(pair_key("alice", "bob"), pair_key("bob", "alice"));
    }
}
