// db/interactiondb.rs
use async_trait::async_trait;
use sqlx::{Error, Row};
use uuid::Uuid;

use super::db::DBClient;
use crate::models::interactionmodel::*;

#[async_trait]
pub trait InteractionExt {
    async fn upsert_interaction(
        &self,
        job_id: Uuid,
        user_id: Uuid,
        status: InteractionStatus,
        has_unread: bool,
    ) -> Result<Interaction, Error>;

    async fn get_job_interactions(&self, job_id: Uuid) -> Result<Vec<Interaction>, Error>;

    async fn get_interactions_for_jobs(&self, job_ids: &[Uuid]) -> Result<Vec<Interaction>, Error>;

    async fn count_interactions_by_status(&self, job_id: Uuid) -> Result<InteractionCounts, Error>;

    /// Sets `status` on every interaction of the job except `exclude_user_id`.
    async fn bulk_set_interaction_status(
        &self,
        job_id: Uuid,
        exclude_user_id: Uuid,
        status: InteractionStatus,
    ) -> Result<u64, Error>;
}

#[async_trait]
impl InteractionExt for DBClient {
    async fn upsert_interaction(
        &self,
        job_id: Uuid,
        user_id: Uuid,
        status: InteractionStatus,
        has_unread: bool,
    ) -> Result<Interaction, Error> {
        sqlx::query_as::<_, Interaction>(
            r#"
            INSERT INTO interactions (id, job_id, user_id, status, has_unread, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (job_id, user_id)
            DO UPDATE SET status = EXCLUDED.status,
                          has_unread = EXCLUDED.has_unread,
                          updated_at = NOW()
            RETURNING id, job_id, user_id, status, has_unread, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(job_id)
        .bind(user_id)
        .bind(status)
        .bind(has_unread)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_job_interactions(&self, job_id: Uuid) -> Result<Vec<Interaction>, Error> {
        sqlx::query_as::<_, Interaction>(
            r#"
            SELECT id, job_id, user_id, status, has_unread, updated_at
            FROM interactions
            WHERE job_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_interactions_for_jobs(&self, job_ids: &[Uuid]) -> Result<Vec<Interaction>, Error> {
        sqlx::query_as::<_, Interaction>(
            r#"
            SELECT id, job_id, user_id, status, has_unread, updated_at
            FROM interactions
            WHERE job_id = ANY($1)
            ORDER BY updated_at DESC
            "#,
        )
        .bind(job_ids)
        .fetch_all(&self.pool)
        .await
    }

    async fn count_interactions_by_status(&self, job_id: Uuid) -> Result<InteractionCounts, Error> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'viewed') AS viewed,
                COUNT(*) FILTER (WHERE status = 'contacted') AS contacted,
                COUNT(*) FILTER (WHERE status = 'offered') AS offered,
                COUNT(*) AS total
            FROM interactions
            WHERE job_id = $1
            "#,
        )
        .bind(job_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(InteractionCounts {
            viewed: row.try_get("viewed")?,
            contacted: row.try_get("contacted")?,
            offered: row.try_get("offered")?,
            total: row.try_get("total")?,
        })
    }

    async fn bulk_set_interaction_status(
        &self,
        job_id: Uuid,
        exclude_user_id: Uuid,
        status: InteractionStatus,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE interactions
            SET status = $3, updated_at = NOW()
            WHERE job_id = $1 AND user_id <> $2
            "#,
        )
        .bind(job_id)
        .bind(exclude_user_id)
        .bind(status)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
