// db/jobdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::jobmodel::*;

const JOB_COLUMNS: &str = r#"
    id, client_id, professional_id,
    title, description, category_id, budget,
    lifecycle_status, tracking_status,
    client_finished, pro_finished, client_rated, pro_rated,
    offers, project_history,
    hired_professional_id, closure_reason, closed_at,
    version, created_at, updated_at
"#;

#[async_trait]
pub trait JobExt {
    async fn insert_job(&self, job: &Job) -> Result<Job, Error>;

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, Error>;

    async fn get_jobs_by_client(&self, client_id: Uuid) -> Result<Vec<Job>, Error>;

    /// Open jobs plus every job the professional bid on, interacted with or won.
    async fn get_jobs_for_professional(&self, pro_id: Uuid) -> Result<Vec<Job>, Error>;

    async fn get_all_jobs(&self) -> Result<Vec<Job>, Error>;

    /// Writes the whole document back if nobody else wrote since `job.version`
    /// was read. Returns `None` on a version mismatch.
    async fn replace_job(&self, job: &Job) -> Result<Option<Job>, Error>;

    /// Hard delete, cascading to interactions and conversations.
    async fn delete_job(&self, job_id: Uuid) -> Result<bool, Error>;
}

#[async_trait]
impl JobExt for DBClient {
    async fn insert_job(&self, job: &Job) -> Result<Job, Error> {
        let query = format!(
            r#"
            INSERT INTO jobs
            (id, client_id, professional_id, title, description, category_id, budget,
             lifecycle_status, tracking_status, client_finished, pro_finished,
             client_rated, pro_rated, offers, project_history, hired_professional_id,
             closure_reason, closed_at, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20, $21)
            RETURNING {JOB_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Job>(&query)
            .bind(job.id)
            .bind(job.client_id)
            .bind(job.professional_id)
            .bind(&job.title)
            .bind(&job.description)
            .bind(job.category_id)
            .bind(job.budget)
            .bind(job.lifecycle_status)
            .bind(job.tracking_status)
            .bind(job.client_finished)
            .bind(job.pro_finished)
            .bind(job.client_rated)
            .bind(job.pro_rated)
            .bind(&job.offers)
            .bind(&job.project_history)
            .bind(job.hired_professional_id)
            .bind(&job.closure_reason)
            .bind(job.closed_at)
            .bind(job.version)
            .bind(job.created_at)
            .bind(job.updated_at)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, Error> {
        let query = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");

        sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_jobs_by_client(&self, client_id: Uuid) -> Result<Vec<Job>, Error> {
        let query = format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE client_id = $1 ORDER BY created_at DESC"
        );

        sqlx::query_as::<_, Job>(&query)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_jobs_for_professional(&self, pro_id: Uuid) -> Result<Vec<Job>, Error> {
        let query = format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE lifecycle_status = 'active'
               OR professional_id = $1
               OR offers @> jsonb_build_array(jsonb_build_object('proId', $1::text))
               OR EXISTS (
                    SELECT 1 FROM interactions i
                    WHERE i.job_id = jobs.id AND i.user_id = $1
               )
            ORDER BY created_at DESC
            "#
        );

        sqlx::query_as::<_, Job>(&query)
            .bind(pro_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_all_jobs(&self) -> Result<Vec<Job>, Error> {
        let query = format!("SELECT {JOB_COLUMNS} FROM jobs ORDER BY created_at DESC");

        sqlx::query_as::<_, Job>(&query)
            .fetch_all(&self.pool)
            .await
    }

    async fn replace_job(&self, job: &Job) -> Result<Option<Job>, Error> {
        let query = format!(
            r#"
            UPDATE jobs
            SET professional_id = $3,
                title = $4,
                description = $5,
                category_id = $6,
                budget = $7,
                lifecycle_status = $8,
                tracking_status = $9,
                client_finished = $10,
                pro_finished = $11,
                client_rated = $12,
                pro_rated = $13,
                offers = $14,
                project_history = $15,
                hired_professional_id = $16,
                closure_reason = $17,
                closed_at = $18,
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $2
            RETURNING {JOB_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Job>(&query)
            .bind(job.id)
            .bind(job.version)
            .bind(job.professional_id)
            .bind(&job.title)
            .bind(&job.description)
            .bind(job.category_id)
            .bind(job.budget)
            .bind(job.lifecycle_status)
            .bind(job.tracking_status)
            .bind(job.client_finished)
            .bind(job.pro_finished)
            .bind(job.client_rated)
            .bind(job.pro_rated)
            .bind(&job.offers)
            .bind(&job.project_history)
            .bind(job.hired_professional_id)
            .bind(&job.closure_reason)
            .bind(job.closed_at)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_job(&self, job_id: Uuid) -> Result<bool, Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM interactions WHERE job_id = $1")
            .bind(job_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            DELETE FROM chat_messages
            WHERE conversation_id IN (SELECT id FROM conversations WHERE job_id = $1)
            "#,
        )
        .bind(job_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM conversations WHERE job_id = $1")
            .bind(job_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(job_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(deleted.rows_affected() > 0)
    }
}
