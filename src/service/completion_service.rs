// service/completion_service.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::MarketStore,
    models::{
        jobmodel::*,
        reviewmodel::{Review, ReviewAnswers, ReviewerRole},
        usermodel::User,
    },
    service::{
        audit_service::AuditService,
        error::ServiceError,
        hooks::PostCommitHooks,
        job_writer::{mutate_job, JobWrite},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Client,
    Professional,
}

fn side_of(job: &Job, user_id: Uuid) -> Option<Side> {
    if job.client_id == user_id {
        Some(Side::Client)
    } else if job.professional_id == Some(user_id) {
        Some(Side::Professional)
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub struct CompletionService {
    db_client: Arc<dyn MarketStore>,
    hooks: Arc<PostCommitHooks>,
    audit_service: Arc<AuditService>,
}

impl CompletionService {
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

    /// The hired professional reports that work has begun.
    pub async fn confirm_start(&self, caller: &User, job_id: Uuid) -> Result<Job, ServiceError> {
        let write = mutate_job(self.db_client.as_ref(), job_id, |job| {
            if job.professional_id != Some(caller.id) {
                return Err(ServiceError::UnauthorizedJobAccess(caller.id, job_id));
            }
            if job.lifecycle_status != LifecycleStatus::InProgress {
                return Err(ServiceError::InvalidJobStatus(job_id, job.lifecycle_status));
            }
            if job.tracking_status != TrackingStatus::Contracted {
                return Ok(false);
            }

            job.tracking_status = TrackingStatus::Started;
            job.record(HistoryEventKind::WorkStarted, Some(caller.id), None);
            Ok(true)
        })
        .await?;

        if write.changed {
            self.audit_service
                .log_job_transition(caller.id, &write.job, "work_started");
        }

        Ok(write.job)
    }

    /// Sets the caller's finish flag. Both flags set, in either order, is
    /// what completes the job; repeated calls change nothing.
    pub async fn finish(&self, caller: &User, job_id: Uuid) -> Result<Job, ServiceError> {
        let mut flipped = None;

        let write = mutate_job(self.db_client.as_ref(), job_id, |job| {
            flipped = None;
            let side = side_of(job, caller.id)
                .ok_or(ServiceError::UnauthorizedJobAccess(caller.id, job_id))?;

            match job.lifecycle_status {
                LifecycleStatus::Completed | LifecycleStatus::Rated => return Ok(false),
                LifecycleStatus::InProgress => {}
                other => return Err(ServiceError::InvalidJobStatus(job_id, other)),
            }

            match side {
                Side::Client if job.client_finished => return Ok(false),
                Side::Professional if job.pro_finished => return Ok(false),
                Side::Client => {
                    job.client_finished = true;
                    job.record(HistoryEventKind::ClientFinished, Some(caller.id), None);
                }
                Side::Professional => {
                    job.pro_finished = true;
                    job.record(HistoryEventKind::ProFinished, Some(caller.id), None);
                }
            }

            if job.client_finished && job.pro_finished {
                job.lifecycle_status = LifecycleStatus::Completed;
                job.tracking_status = TrackingStatus::Finished;
                job.record(HistoryEventKind::Completed, None, None);
            }

            flipped = Some(side);
            Ok(true)
        })
        .await?;

        if !write.changed {
            return Ok(write.job);
        }

        let transition = match flipped {
            Some(Side::Client) => "client_finished",
            _ => "pro_finished",
        };
        self.audit_service
            .log_job_transition(caller.id, &write.job, transition);

        if flipped == Some(Side::Professional) {
            self.hooks.professional_finished(&write.job).await;
        }

        Ok(write.job)
    }

    /// Stores one review per (reviewer, reviewee) on a finished job, marks the
    /// job rated and refreshes the reviewee's aggregate rating.
    pub async fn rate_mutual(
        &self,
        caller: &User,
        job_id: Uuid,
        reviewee_id: Uuid,
        rating: i32,
        comment: String,
        answers: ReviewAnswers,
    ) -> Result<Review, ServiceError> {
        validate_score("rating", Some(rating))?;
        validate_score("punctuality", answers.punctuality)?;
        validate_score("quality", answers.quality)?;
        validate_score("communication", answers.communication)?;

        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if !matches!(
            job.lifecycle_status,
            LifecycleStatus::Completed | LifecycleStatus::Rated
        ) {
            return Err(ServiceError::InvalidJobStatus(job_id, job.lifecycle_status));
        }

        let (reviewer_role, counterpart) = match side_of(&job, caller.id) {
            Some(Side::Client) => (ReviewerRole::Client, job.professional_id),
            Some(Side::Professional) => (ReviewerRole::Professional, Some(job.client_id)),
            None => return Err(ServiceError::UnauthorizedJobAccess(caller.id, job_id)),
        };
        if counterpart != Some(reviewee_id) {
            return Err(ServiceError::Validation(
                "Reviews can only be left for the other party of the job".to_string(),
            ));
        }

        // A stored review may be left over from a call that failed after the
        // insert. Finish its effects before reporting the duplicate.
        if let Some(existing) = self
            .db_client
            .get_review(job_id, caller.id, reviewee_id)
            .await?
        {
            self.repair_review_effects(caller, &existing).await?;
            return Err(ServiceError::DuplicateReview(caller.id, job_id));
        }

        let created = self
            .db_client
            .create_review(
                job_id,
                caller.id,
                reviewee_id,
                reviewer_role,
                rating,
                answers,
                comment,
            )
            .await;

        let review = match created {
            Ok(review) => review,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                if let Some(existing) = self
                    .db_client
                    .get_review(job_id, caller.id, reviewee_id)
                    .await?
                {
                    self.repair_review_effects(caller, &existing).await?;
                }
                return Err(ServiceError::DuplicateReview(caller.id, job_id));
            }
            Err(e) => return Err(ServiceError::Database(e)),
        };

        let job = self.apply_review_effects(caller, &review).await?;

        self.audit_service.log_review(&review);
        self.hooks
            .review_submitted(&job, reviewee_id, review.rating)
            .await;

        Ok(review)
    }

    async fn repair_review_effects(
        &self,
        caller: &User,
        review: &Review,
    ) -> Result<(), ServiceError> {
        let flag_was_missing = self.mark_rated(caller, review).await?.changed;
        self.recompute_rating(review).await?;

        if flag_was_missing {
            tracing::warn!(
                job_id = %review.job_id,
                review_id = %review.id,
                "completed an interrupted review"
            );
            self.audit_service.log_review(review);
        }
        Ok(())
    }

    /// Marks the job rated for the reviewer's side and refreshes the
    /// reviewee's aggregate. Both steps are idempotent.
    async fn apply_review_effects(
        &self,
        caller: &User,
        review: &Review,
    ) -> Result<Job, ServiceError> {
        let write = self.mark_rated(caller, review).await?;
        self.recompute_rating(review).await?;
        Ok(write.job)
    }

    async fn mark_rated(&self, caller: &User, review: &Review) -> Result<JobWrite, ServiceError> {
        let reviewer_role = review.reviewer_role;
        let rating = review.rating;

        mutate_job(self.db_client.as_ref(), review.job_id, |job| {
            let already_flagged = match reviewer_role {
                ReviewerRole::Client => job.client_rated,
                ReviewerRole::Professional => job.pro_rated,
            };
            if already_flagged && job.lifecycle_status == LifecycleStatus::Rated {
                return Ok(false);
            }

            match reviewer_role {
                ReviewerRole::Client => job.client_rated = true,
                ReviewerRole::Professional => job.pro_rated = true,
            }
            job.lifecycle_status = LifecycleStatus::Rated;
            job.record(
                HistoryEventKind::Rated,
                Some(caller.id),
                Some(rating.to_string()),
            );
            Ok(true)
        })
        .await
    }

    async fn recompute_rating(&self, review: &Review) -> Result<(), ServiceError> {
        let aggregate = self
            .db_client
            .get_rating_aggregate(review.reviewee_id, review.reviewer_role)
            .await?;
        self.db_client
            .update_user_rating(review.reviewee_id, aggregate.rating, aggregate.reviews_count)
            .await?;

        tracing::info!(
            job_id = %review.job_id,
            reviewee_id = %review.reviewee_id,
            rating = aggregate.rating,
            reviews_count = aggregate.reviews_count,
            "reviewee rating recomputed"
        );
        Ok(())
    }
}

fn validate_score(field: &str, score: Option<i32>) -> Result<(), ServiceError> {
    match score {
        Some(value) if !(1..=5).contains(&value) => Err(ServiceError::Validation(format!(
            "{} must be between 1 and 5",
            field
        ))),
        _ => Ok(()),
    }
}
