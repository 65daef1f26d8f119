// db/notificationdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::notificationmodel::Notification;

#[async_trait]
pub trait NotificationExt {
    async fn store_notification(
        &self,
        user_id: Uuid,
        kind: String,
        job_id: Option<Uuid>,
        message: String,
        metadata: Option<serde_json::Value>,
    ) -> Result<Notification, Error>;
}

#[async_trait]
impl NotificationExt for DBClient {
    async fn store_notification(
        &self,
        user_id: Uuid,
        kind: String,
        job_id: Option<Uuid>,
        message: String,
        metadata: Option<serde_json::Value>,
    ) -> Result<Notification, Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, user_id, kind, job_id, message, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING id, user_id, kind, job_id, message, metadata, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(kind)
        .bind(job_id)
        .bind(message)
        .bind(metadata)
        .fetch_one(&self.pool)
        .await
    }
}
