// service/offer_service.rs
use std::sync::Arc;
use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    db::MarketStore,
    models::{
        jobmodel::*,
        usermodel::{User, UserRole},
    },
    service::{
        audit_service::AuditService,
        error::ServiceError,
        hooks::PostCommitHooks,
        job_writer::mutate_job,
    },
};

pub const SELECTED_ANOTHER_REASON: &str = "Another professional was selected for this job";

#[derive(Debug, Clone)]
pub struct OfferService {
    db_client: Arc<dyn MarketStore>,
    hooks: Arc<PostCommitHooks>,
    audit_service: Arc<AuditService>,
}

impl OfferService {
    pub fn new(
        db_client: Arc<dyn MarketStore>,
        hooks: Arc<PostCommitHooks>,
        audit_service: Arc<AuditService>,
    ) -> Self {
        Self {
            db_client,
            hooks,
            audit_service,
        }
    }

    pub async fn submit(
        &self,
        caller: &User,
        job_id: Uuid,
        amount: f64,
        terms: OfferTerms,
    ) -> Result<Job, ServiceError> {
        if caller.role != UserRole::Professional {
            return Err(ServiceError::UnauthorizedJobAccess(caller.id, job_id));
        }
        validate_amount(amount)?;

        let offer = Offer::new(caller.id, amount, terms);

        let write = mutate_job(self.db_client.as_ref(), job_id, |job| {
            if job.client_id == caller.id {
                return Err(ServiceError::UnauthorizedJobAccess(caller.id, job_id));
            }
            if job.lifecycle_status != LifecycleStatus::Active {
                return Err(ServiceError::InvalidJobStatus(job_id, job.lifecycle_status));
            }
            if job.offer_by_pro(caller.id).is_some() {
                return Err(ServiceError::DuplicateOffer(caller.id, job_id));
            }

            let mut offers = job.offers.0.clone();
            offers.push(offer.clone());
            job.offers = Json(offers);
            job.record(
                HistoryEventKind::OfferSubmitted,
                Some(caller.id),
                Some(format!("{:.2}", amount)),
            );
            Ok(true)
        })
        .await?;

        self.audit_service.log_offer_submission(caller.id, &write.job, &offer);
        self.hooks.offer_submitted(&write.job, &offer).await;

        Ok(write.job)
    }

    /// Replaces the caller's terms and puts the offer back to pending,
    /// whatever state the offer or the job is in.
    pub async fn amend(
        &self,
        caller: &User,
        job_id: Uuid,
        amount: f64,
        terms: OfferTerms,
    ) -> Result<Job, ServiceError> {
        validate_amount(amount)?;

        let write = mutate_job(self.db_client.as_ref(), job_id, |job| {
            if job.offer_by_pro(caller.id).is_none() {
                return Err(ServiceError::NoOfferFromProfessional(caller.id, job_id));
            }

            let now = Utc::now();
            let offers = job
                .offers
                .iter()
                .map(|offer| {
                    if offer.pro_id != caller.id {
                        return offer.clone();
                    }
                    Offer {
                        amount,
                        terms: terms.clone(),
                        status: OfferStatus::Pending,
                        rejection_reason: None,
                        updated_at: now,
                        ..offer.clone()
                    }
                })
                .collect();
            job.offers = Json(offers);
            job.record(
                HistoryEventKind::OfferAmended,
                Some(caller.id),
                Some(format!("{:.2}", amount)),
            );
            Ok(true)
        })
        .await?;

        if let Some(offer) = write.job.offer_by_pro(caller.id) {
            self.audit_service
                .log_offer_change(caller.id, job_id, offer.id, "amended");
        }

        Ok(write.job)
    }

    /// Assignment. The whole offers array is rewritten in the same guarded
    /// write that moves the job to in_progress, so at most one offer can ever
    /// be accepted.
    pub async fn accept(
        &self,
        caller: &User,
        job_id: Uuid,
        winner_id: Uuid,
    ) -> Result<Job, ServiceError> {
        let write = mutate_job(self.db_client.as_ref(), job_id, |job| {
            if job.client_id != caller.id {
                return Err(ServiceError::UnauthorizedJobAccess(caller.id, job_id));
            }
            if job.professional_id.is_some() || job.has_offer_in(OfferStatus::Accepted) {
                return Err(ServiceError::JobAlreadyAssigned(job_id));
            }
            if job.lifecycle_status != LifecycleStatus::Active {
                return Err(ServiceError::InvalidJobStatus(job_id, job.lifecycle_status));
            }
            if job.offer_by_pro(winner_id).is_none() {
                return Err(ServiceError::NoOfferFromProfessional(winner_id, job_id));
            }

            let now = Utc::now();
            let offers = job
                .offers
                .iter()
                .map(|offer| {
                    let mut offer = offer.clone();
                    if offer.pro_id == winner_id {
                        offer.status = OfferStatus::Accepted;
                        offer.rejection_reason = None;
                        offer.updated_at = now;
                    } else if offer.status != OfferStatus::Rejected {
                        offer.status = OfferStatus::Rejected;
                        offer.rejection_reason = Some(SELECTED_ANOTHER_REASON.to_string());
                        offer.updated_at = now;
                    }
                    offer
                })
                .collect();

            job.offers = Json(offers);
            job.professional_id = Some(winner_id);
            job.hired_professional_id = Some(winner_id);
            job.lifecycle_status = LifecycleStatus::InProgress;
            job.tracking_status = TrackingStatus::Contracted;
            job.record(
                HistoryEventKind::OfferAccepted,
                Some(caller.id),
                Some(winner_id.to_string()),
            );
            Ok(true)
        })
        .await?;

        self.audit_service
            .log_assignment(caller.id, winner_id, &write.job);
        self.hooks.professional_assigned(&write.job, winner_id).await;

        Ok(write.job)
    }

    pub async fn reject(
        &self,
        caller: &User,
        job_id: Uuid,
        pro_id: Uuid,
        reason: String,
    ) -> Result<Job, ServiceError> {
        let write = mutate_job(self.db_client.as_ref(), job_id, |job| {
            if job.client_id != caller.id && caller.role != UserRole::Admin {
                return Err(ServiceError::UnauthorizedJobAccess(caller.id, job_id));
            }
            let offer = job
                .offer_by_pro(pro_id)
                .ok_or(ServiceError::NoOfferFromProfessional(pro_id, job_id))?;
            if offer.status == OfferStatus::Accepted {
                return Err(ServiceError::Validation(
                    "An accepted offer cannot be rejected".to_string(),
                ));
            }

            let now = Utc::now();
            let offers = job
                .offers
                .iter()
                .map(|offer| {
                    let mut offer = offer.clone();
                    if offer.pro_id == pro_id {
                        offer.status = OfferStatus::Rejected;
                        offer.rejection_reason = Some(reason.clone());
                        offer.updated_at = now;
                    }
                    offer
                })
                .collect();
            job.offers = Json(offers);
            job.record(
                HistoryEventKind::OfferRejected,
                Some(caller.id),
                Some(reason.clone()),
            );
            Ok(true)
        })
        .await?;

        if let Some(offer) = write.job.offer_by_pro(pro_id) {
            self.audit_service
                .log_offer_change(caller.id, job_id, offer.id, "rejected");
            self.hooks.offer_rejected(&write.job, offer).await;
        }

        Ok(write.job)
    }

    /// Removes one offer by id and returns the job it belonged to.
    pub async fn withdraw(
        &self,
        caller: &User,
        job_id: Uuid,
        offer_id: Uuid,
    ) -> Result<Uuid, ServiceError> {
        mutate_job(self.db_client.as_ref(), job_id, |job| {
            let offer = job
                .offers
                .iter()
                .find(|offer| offer.id == offer_id)
                .ok_or(ServiceError::OfferNotFound(offer_id))?;

            let permitted = caller.role == UserRole::Admin
                || job.client_id == caller.id
                || offer.pro_id == caller.id;
            if !permitted {
                return Err(ServiceError::UnauthorizedJobAccess(caller.id, job_id));
            }
            if offer.status == OfferStatus::Accepted {
                return Err(ServiceError::Validation(
                    "The accepted offer cannot be withdrawn".to_string(),
                ));
            }

            let offers = job
                .offers
                .iter()
                .filter(|offer| offer.id != offer_id)
                .cloned()
                .collect();
            job.offers = Json(offers);
            job.record(
                HistoryEventKind::OfferWithdrawn,
                Some(caller.id),
                Some(offer_id.to_string()),
            );
            Ok(true)
        })
        .await?;

        self.audit_service
            .log_offer_change(caller.id, job_id, offer_id, "withdrawn");

        Ok(job_id)
    }
}

fn validate_amount(amount: f64) -> Result<(), ServiceError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ServiceError::Validation(
            "Offer amount must be greater than zero".to_string(),
        ));
    }
    Ok(())
}
