// service/notification_service.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::MarketStore,
    models::jobmodel::{Job, Offer},
    service::error::ServiceError,
};

#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<dyn MarketStore>,
}

impl NotificationService {
    pub fn new(db_client: Arc<dyn MarketStore>) -> Self {
        Self { db_client }
    }

    pub async fn notify_new_offer(&self, job: &Job, offer: &Offer) -> Result<(), ServiceError> {
        tracing::info!(
            "New offer notification: job {} received {:.2} from {}",
            job.id,
            offer.amount,
            offer.pro_id
        );

        self.store_notification(
            job.client_id,
            "new_offer",
            job.id,
            Some(serde_json::json!({
                "offer_id": offer.id,
                "pro_id": offer.pro_id,
                "amount": offer.amount,
            })),
            format!("New offer on {}: {:.2}", job.title, offer.amount),
        )
        .await
    }

    pub async fn notify_job_assignment(
        &self,
        professional_id: Uuid,
        job: &Job,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            "Job assignment notification: professional {} assigned to job {}",
            professional_id,
            job.id
        );

        self.store_notification(
            professional_id,
            "job_assigned",
            job.id,
            Some(serde_json::json!({
                "job_title": job.title,
                "client_id": job.client_id,
            })),
            format!("You've been hired for: {}", job.title),
        )
        .await
    }

    pub async fn notify_offer_rejected(
        &self,
        job: &Job,
        offer: &Offer,
    ) -> Result<(), ServiceError> {
        self.store_notification(
            offer.pro_id,
            "offer_rejected",
            job.id,
            Some(serde_json::json!({
                "offer_id": offer.id,
                "reason": offer.rejection_reason,
            })),
            format!("Your offer on {} was declined", job.title),
        )
        .await
    }

    pub async fn notify_work_finished(&self, job: &Job) -> Result<(), ServiceError> {
        tracing::info!("Work finished notification: job {} awaits client validation", job.id);

        self.store_notification(
            job.client_id,
            "work_finished",
            job.id,
            None,
            format!("The professional marked {} as finished, please validate it", job.title),
        )
        .await
    }

    pub async fn notify_review_received(
        &self,
        reviewee_id: Uuid,
        job: &Job,
        rating: i32,
    ) -> Result<(), ServiceError> {
        self.store_notification(
            reviewee_id,
            "review_received",
            job.id,
            Some(serde_json::json!({ "rating": rating })),
            format!("You received a {}-star review for {}", rating, job.title),
        )
        .await
    }

    async fn store_notification(
        &self,
        user_id: Uuid,
        kind: &str,
        job_id: Uuid,
        metadata: Option<serde_json::Value>,
        message: String,
    ) -> Result<(), ServiceError> {
        self.db_client
            .store_notification(user_id, kind.to_string(), Some(job_id), message, metadata)
            .await?;

        Ok(())
    }
}
