// service/job_service.rs
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::MarketStore,
    dtos::jobdtos::{AdminJobStatuses, JobView},
    models::{
        interactionmodel::InteractionCounts,
        jobmodel::*,
        usermodel::{User, UserRole},
    },
    service::{
        audit_service::AuditService,
        error::ServiceError,
        hooks::PostCommitHooks,
        interaction_service::InteractionTracker,
        job_writer::mutate_job,
        status::{admin_statuses, client_label, derive_status, StatusSignals},
    },
};

#[derive(Debug, Clone)]
pub struct JobService {
    db_client: Arc<dyn MarketStore>,
    interactions: InteractionTracker,
    hooks: Arc<PostCommitHooks>,
    audit_service: Arc<AuditService>,
}

impl JobService {
    pub fn new(
        db_client: Arc<dyn MarketStore>,
        interactions: InteractionTracker,
        hooks: Arc<PostCommitHooks>,
        audit_service: Arc<AuditService>,
    ) -> Self {
        Self {
            db_client,
            interactions,
            hooks,
            audit_service,
        }
    }

    pub async fn create(
        &self,
        caller: &User,
        title: String,
        description: String,
        category_id: Option<Uuid>,
        budget: Option<f64>,
    ) -> Result<Job, ServiceError> {
        if caller.role != UserRole::Client {
            return Err(ServiceError::Validation(
                "Only clients can post jobs".to_string(),
            ));
        }

        let job = Job::new(caller.id, title, description, category_id, budget);
        let job = self.db_client.insert_job(&job).await?;

        self.audit_service.log_job_creation(caller.id, &job);

        Ok(job)
    }

    async fn load(&self, job_id: Uuid) -> Result<Job, ServiceError> {
        self.db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))
    }

    /// Everything outside the job document that the labels depend on.
    pub async fn load_signals(&self, job: &Job) -> Result<StatusSignals, ServiceError> {
        let interactions = self.db_client.get_job_interactions(job.id).await?;
        let conversations = self.db_client.get_job_conversations(job.id).await?;
        let has_rating = job.client_rated
            || job.pro_rated
            || self.db_client.job_has_reviews(job.id).await?;

        Ok(StatusSignals {
            interactions,
            conversations,
            has_rating,
        })
    }

    /// Signals for many jobs with one query per source.
    async fn load_signals_batch(
        &self,
        jobs: &[Job],
    ) -> Result<HashMap<Uuid, StatusSignals>, ServiceError> {
        let job_ids: Vec<Uuid> = jobs.iter().map(|job| job.id).collect();
        let interactions = self.db_client.get_interactions_for_jobs(&job_ids).await?;
        let conversations = self.db_client.get_conversations_for_jobs(&job_ids).await?;
        let reviewed: HashSet<Uuid> = self
            .db_client
            .get_reviewed_job_ids(&job_ids)
            .await?
            .into_iter()
            .collect();

        let mut signals: HashMap<Uuid, StatusSignals> = jobs
            .iter()
            .map(|job| {
                let has_rating = job.client_rated || job.pro_rated || reviewed.contains(&job.id);
                (
                    job.id,
                    StatusSignals {
                        has_rating,
                        ..StatusSignals::default()
                    },
                )
            })
            .collect();

        for interaction in interactions {
            if let Some(entry) = signals.get_mut(&interaction.job_id) {
                entry.interactions.push(interaction);
            }
        }
        for conversation in conversations {
            if let Some(entry) = signals.get_mut(&conversation.job_id) {
                entry.conversations.push(conversation);
            }
        }

        Ok(signals)
    }

    pub async fn decorate(&self, job: Job, viewer: &User) -> Result<JobView, ServiceError> {
        let signals = self.load_signals(&job).await?;
        Ok(view_for(job, &signals, viewer))
    }

    pub async fn get_view(&self, viewer: &User, job_id: Uuid) -> Result<JobView, ServiceError> {
        let job = self.load(job_id).await?;

        // Any professional may open a job; listings are what stay scoped.
        let visible = match viewer.role {
            UserRole::Client => job.client_id == viewer.id,
            UserRole::Professional | UserRole::Admin => true,
        };
        if !visible {
            return Err(ServiceError::UnauthorizedJobAccess(viewer.id, job_id));
        }

        self.decorate(job, viewer).await
    }

    pub async fn list_views(&self, viewer: &User) -> Result<Vec<JobView>, ServiceError> {
        let jobs = match viewer.role {
            UserRole::Client => self.db_client.get_jobs_by_client(viewer.id).await?,
            UserRole::Professional => self.db_client.get_jobs_for_professional(viewer.id).await?,
            UserRole::Admin => self.db_client.get_all_jobs().await?,
        };

        let signals = self.load_signals_batch(&jobs).await?;
        let views = jobs
            .into_iter()
            .map(|job| {
                let job_signals = signals.get(&job.id).cloned().unwrap_or_default();
                view_for(job, &job_signals, viewer)
            })
            .collect();
        Ok(views)
    }

    pub async fn interaction_summary(
        &self,
        caller: &User,
        job_id: Uuid,
    ) -> Result<InteractionCounts, ServiceError> {
        let job = self.load(job_id).await?;
        if job.client_id != caller.id && caller.role != UserRole::Admin {
            return Err(ServiceError::UnauthorizedJobAccess(caller.id, job_id));
        }

        self.interactions.counts_by_status(job_id).await
    }

    /// Client cancels the job. Work that already finished cannot be canceled.
    pub async fn close(
        &self,
        caller: &User,
        job_id: Uuid,
        reason: String,
    ) -> Result<Job, ServiceError> {
        let write = mutate_job(self.db_client.as_ref(), job_id, |job| {
            if job.client_id != caller.id {
                return Err(ServiceError::UnauthorizedJobAccess(caller.id, job_id));
            }
            match job.lifecycle_status {
                LifecycleStatus::Active
                | LifecycleStatus::InProgress
                | LifecycleStatus::Archived => {}
                other => return Err(ServiceError::InvalidJobStatus(job_id, other)),
            }

            job.lifecycle_status = LifecycleStatus::Canceled;
            job.closure_reason = Some(reason.clone());
            job.closed_at = Some(Utc::now());
            job.record(HistoryEventKind::Closed, Some(caller.id), Some(reason.clone()));
            Ok(true)
        })
        .await?;

        self.audit_service
            .log_job_transition(caller.id, &write.job, "closed");
        self.hooks.job_closed(&write.job).await;

        Ok(write.job)
    }

    /// Shelves a job that is still open for offers.
    pub async fn archive(&self, caller: &User, job_id: Uuid) -> Result<Job, ServiceError> {
        let write = mutate_job(self.db_client.as_ref(), job_id, |job| {
            if job.client_id != caller.id && caller.role != UserRole::Admin {
                return Err(ServiceError::UnauthorizedJobAccess(caller.id, job_id));
            }
            match job.lifecycle_status {
                LifecycleStatus::Archived => return Ok(false),
                LifecycleStatus::Active => {}
                other => return Err(ServiceError::InvalidJobStatus(job_id, other)),
            }

            job.lifecycle_status = LifecycleStatus::Archived;
            job.closed_at = Some(Utc::now());
            job.record(HistoryEventKind::Archived, Some(caller.id), None);
            Ok(true)
        })
        .await?;

        if write.changed {
            self.audit_service
                .log_job_transition(caller.id, &write.job, "archived");
            self.hooks.job_closed(&write.job).await;
        }

        Ok(write.job)
    }

    pub async fn admin_delete(&self, admin: &User, job_id: Uuid) -> Result<(), ServiceError> {
        if !self.db_client.delete_job(job_id).await? {
            return Err(ServiceError::JobNotFound(job_id));
        }

        self.audit_service.log_job_deletion(admin, job_id);
        Ok(())
    }

    pub async fn admin_statuses(&self, job_id: Uuid) -> Result<AdminJobStatuses, ServiceError> {
        let job = self.load(job_id).await?;
        let signals = self.load_signals(&job).await?;

        Ok(AdminJobStatuses {
            job_id,
            calculated_client_status: client_label(&job, &signals),
            professionals: admin_statuses(&job, &signals),
        })
    }
}

fn view_for(job: Job, signals: &StatusSignals, viewer: &User) -> JobView {
    let status = derive_status(&job, signals, viewer.id, viewer.role);

    let interaction_counts = match viewer.role {
        UserRole::Client | UserRole::Admin => Some(InteractionCounts::tally(&signals.interactions)),
        UserRole::Professional => None,
    };

    JobView {
        job,
        calculated_client_status: status.client_label,
        calculated_pro_status: status.pro_label,
        interaction_counts,
    }
}
