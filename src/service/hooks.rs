// service/hooks.rs
use uuid::Uuid;

use crate::{
    models::{
        interactionmodel::InteractionStatus,
        jobmodel::{Job, Offer},
    },
    service::{
        chat_link::ChatLinkage, error::ServiceError, interaction_service::InteractionTracker,
        notification_service::NotificationService,
    },
};

/// Auxiliary writes that follow a committed job mutation. None of them can
/// fail the request: errors are logged and the job write stands.
#[derive(Debug, Clone)]
pub struct PostCommitHooks {
    interactions: InteractionTracker,
    chat: ChatLinkage,
    notifications: NotificationService,
}

impl PostCommitHooks {
    pub fn new(
        interactions: InteractionTracker,
        chat: ChatLinkage,
        notifications: NotificationService,
    ) -> Self {
        Self {
            interactions,
            chat,
            notifications,
        }
    }

    pub async fn offer_submitted(&self, job: &Job, offer: &Offer) {
        best_effort(
            "interaction_offered",
            job.id,
            self.interactions
                .upsert(job.id, offer.pro_id, InteractionStatus::Offered, false)
                .await,
        );
        best_effort(
            "offer_chat_message",
            job.id,
            self.chat.post_offer_summary(job, offer.pro_id, offer.amount).await,
        );
        best_effort(
            "notify_new_offer",
            job.id,
            self.notifications.notify_new_offer(job, offer).await,
        );
    }

    pub async fn professional_assigned(&self, job: &Job, winner_id: Uuid) {
        best_effort(
            "interaction_won",
            job.id,
            self.interactions
                .upsert(job.id, winner_id, InteractionStatus::Won, false)
                .await,
        );
        best_effort(
            "interactions_lost",
            job.id,
            self.interactions
                .bulk_set(job.id, winner_id, InteractionStatus::Lost)
                .await,
        );
        best_effort(
            "notify_assignment",
            job.id,
            self.notifications.notify_job_assignment(winner_id, job).await,
        );
    }

    pub async fn offer_rejected(&self, job: &Job, offer: &Offer) {
        best_effort(
            "interaction_rejected",
            job.id,
            self.interactions
                .upsert(job.id, offer.pro_id, InteractionStatus::Rejected, false)
                .await,
        );
        best_effort(
            "notify_offer_rejected",
            job.id,
            self.notifications.notify_offer_rejected(job, offer).await,
        );
    }

    pub async fn professional_finished(&self, job: &Job) {
        best_effort(
            "notify_work_finished",
            job.id,
            self.notifications.notify_work_finished(job).await,
        );
    }

    pub async fn review_submitted(&self, job: &Job, reviewee_id: Uuid, rating: i32) {
        best_effort(
            "notify_review",
            job.id,
            self.notifications
                .notify_review_received(reviewee_id, job, rating)
                .await,
        );
    }

    pub async fn job_closed(&self, job: &Job) {
        best_effort(
            "interactions_archived",
            job.id,
            self.interactions
                .bulk_set(job.id, job.client_id, InteractionStatus::Archived)
                .await,
        );
    }
}

fn best_effort<T>(step: &str, job_id: Uuid, result: Result<T, ServiceError>) {
    if let Err(error) = result {
        tracing::warn!(%job_id, step, error = %error, "post-commit step failed");
    }
}
