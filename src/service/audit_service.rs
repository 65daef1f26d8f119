// service/audit_service.rs
use uuid::Uuid;

use crate::models::{
    jobmodel::{Job, Offer},
    reviewmodel::Review,
    usermodel::User,
};

/// Structured audit trail of job transitions. Events go to the `audit`
/// tracing target so they can be routed separately from request logs.
#[derive(Debug, Clone, Default)]
pub struct AuditService;

impl AuditService {
    pub fn new() -> Self {
        Self
    }

    pub fn log_job_creation(&self, client_id: Uuid, job: &Job) {
        self.log_audit_event(
            client_id,
            "job_creation",
            job.id,
            None,
            serde_json::json!({
                "title": job.title,
                "budget": job.budget,
            }),
            "Job created",
        );
    }

    pub fn log_offer_submission(&self, pro_id: Uuid, job: &Job, offer: &Offer) {
        self.log_audit_event(
            pro_id,
            "offer_submission",
            job.id,
            Some(job.client_id),
            serde_json::json!({
                "offer_id": offer.id,
                "amount": offer.amount,
            }),
            "Offer submitted",
        );
    }

    pub fn log_offer_change(&self, actor_id: Uuid, job_id: Uuid, offer_id: Uuid, change: &str) {
        self.log_audit_event(
            actor_id,
            "offer_change",
            job_id,
            None,
            serde_json::json!({
                "offer_id": offer_id,
                "change": change,
            }),
            "Offer changed",
        );
    }

    pub fn log_assignment(&self, client_id: Uuid, professional_id: Uuid, job: &Job) {
        let rejected_offers = job
            .offers
            .iter()
            .filter(|o| o.pro_id != professional_id)
            .count();
        self.log_audit_event(
            client_id,
            "job_assignment",
            job.id,
            Some(professional_id),
            serde_json::json!({
                "rejected_offers": rejected_offers,
            }),
            "Professional assigned to job",
        );
    }

    pub fn log_job_transition(&self, actor_id: Uuid, job: &Job, transition: &str) {
        self.log_audit_event(
            actor_id,
            "job_transition",
            job.id,
            job.professional_id,
            serde_json::json!({
                "transition": transition,
                "lifecycle_status": job.lifecycle_status.to_str(),
                "tracking_status": job.tracking_status.to_str(),
            }),
            "Job state changed",
        );
    }

    pub fn log_review(&self, review: &Review) {
        self.log_audit_event(
            review.reviewer_id,
            "review_submission",
            review.job_id,
            Some(review.reviewee_id),
            serde_json::json!({
                "review_id": review.id,
                "rating": review.rating,
                "reviewer_role": review.reviewer_role.to_str(),
            }),
            "Review submitted",
        );
    }

    pub fn log_job_deletion(&self, actor: &User, job_id: Uuid) {
        self.log_audit_event(
            actor.id,
            "job_deletion",
            job_id,
            None,
            serde_json::json!({ "actor_role": actor.role.to_str() }),
            "Job deleted",
        );
    }

    fn log_audit_event(
        &self,
        user_id: Uuid,
        event_type: &str,
        job_id: Uuid,
        related_user_id: Option<Uuid>,
        metadata: serde_json::Value,
        description: &str,
    ) {
        tracing::info!(
            target: "audit",
            %user_id,
            event_type,
            %job_id,
            related_user_id = ?related_user_id,
            metadata = %metadata,
            "{}",
            description
        );
    }
}
