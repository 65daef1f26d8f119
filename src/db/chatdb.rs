// db/chatdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::chatmodels::*;

#[async_trait]
pub trait ChatExt {
    async fn get_conversation(
        &self,
        job_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Option<Conversation>, Error>;

    /// Returns the single conversation for (job, professional), creating it if needed.
    async fn create_or_get_conversation(
        &self,
        job_id: Uuid,
        client_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Conversation, Error>;

    async fn post_system_message(
        &self,
        conversation_id: Uuid,
        body: String,
    ) -> Result<ChatMessage, Error>;

    async fn get_job_conversations(&self, job_id: Uuid) -> Result<Vec<Conversation>, Error>;

    async fn get_conversations_for_jobs(
        &self,
        job_ids: &[Uuid],
    ) -> Result<Vec<Conversation>, Error>;
}

#[async_trait]
impl ChatExt for DBClient {
    async fn get_conversation(
        &self,
        job_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Option<Conversation>, Error> {
        sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, job_id, client_id, professional_id, message_count,
                   last_message_at, created_at
            FROM conversations
            WHERE job_id = $1 AND professional_id = $2
            "#,
        )
        .bind(job_id)
        .bind(professional_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_or_get_conversation(
        &self,
        job_id: Uuid,
        client_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Conversation, Error> {
        // The unique (job_id, professional_id) index makes concurrent creators converge.
        sqlx::query(
            r#"
            INSERT INTO conversations (id, job_id, client_id, professional_id, message_count, created_at)
            VALUES ($1, $2, $3, $4, 0, NOW())
            ON CONFLICT (job_id, professional_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(job_id)
        .bind(client_id)
        .bind(professional_id)
        .execute(&self.pool)
        .await?;

        self.get_conversation(job_id, professional_id)
            .await?
            .ok_or(Error::RowNotFound)
    }

    async fn post_system_message(
        &self,
        conversation_id: Uuid,
        body: String,
    ) -> Result<ChatMessage, Error> {
        let mut tx = self.pool.begin().await?;

        let message = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (id, conversation_id, sender_id, body, created_at)
            VALUES ($1, $2, NULL, $3, NOW())
            RETURNING id, conversation_id, sender_id, body, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(conversation_id)
        .bind(body)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE conversations
            SET message_count = message_count + 1, last_message_at = $2
            WHERE id = $1
            "#,
        )
        .bind(conversation_id)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(message)
    }

    async fn get_job_conversations(&self, job_id: Uuid) -> Result<Vec<Conversation>, Error> {
        sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, job_id, client_id, professional_id, message_count,
                   last_message_at, created_at
            FROM conversations
            WHERE job_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_conversations_for_jobs(
        &self,
        job_ids: &[Uuid],
    ) -> Result<Vec<Conversation>, Error> {
        sqlx::query_as::<_, Conversation>(
            r#"
            SELECT id, job_id, client_id, professional_id, message_count,
                   last_message_at, created_at
            FROM conversations
            WHERE job_id = ANY($1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(job_ids)
        .fetch_all(&self.pool)
        .await
    }
}
