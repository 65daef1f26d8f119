// service/interaction_service.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::MarketStore,
    models::{
        interactionmodel::{Interaction, InteractionCounts, InteractionStatus},
        usermodel::{User, UserRole},
    },
    service::error::ServiceError,
};

/// Per-(job, professional) engagement ledger. Last write wins and no history
/// is kept; the job document stays authoritative for anything beyond badges.
#[derive(Debug, Clone)]
pub struct InteractionTracker {
    db_client: Arc<dyn MarketStore>,
}

impl InteractionTracker {
    pub fn new(db_client: Arc<dyn MarketStore>) -> Self {
        Self { db_client }
    }

    /// Records the caller's own engagement with a job.
    pub async fn track(
        &self,
        caller: &User,
        job_id: Uuid,
        status: InteractionStatus,
        has_unread: bool,
    ) -> Result<Interaction, ServiceError> {
        if caller.role != UserRole::Professional {
            return Err(ServiceError::UnauthorizedJobAccess(caller.id, job_id));
        }
        if !status.is_self_reported() {
            return Err(ServiceError::Validation(format!(
                "Interaction status '{}' cannot be set directly",
                status.to_str()
            )));
        }

        let job = self
            .db_client
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if job.client_id == caller.id {
            return Err(ServiceError::UnauthorizedJobAccess(caller.id, job_id));
        }

        self.upsert(job_id, caller.id, status, has_unread).await
    }

    pub async fn upsert(
        &self,
        job_id: Uuid,
        user_id: Uuid,
        status: InteractionStatus,
        has_unread: bool,
    ) -> Result<Interaction, ServiceError> {
        let interaction = self
            .db_client
            .upsert_interaction(job_id, user_id, status, has_unread)
            .await?;

        tracing::debug!(%job_id, %user_id, status = status.to_str(), "interaction recorded");
        Ok(interaction)
    }

    pub async fn counts_by_status(&self, job_id: Uuid) -> Result<InteractionCounts, ServiceError> {
        Ok(self.db_client.count_interactions_by_status(job_id).await?)
    }

    pub async fn bulk_set(
        &self,
        job_id: Uuid,
        exclude_user_id: Uuid,
        status: InteractionStatus,
    ) -> Result<u64, ServiceError> {
        let updated = self
            .db_client
            .bulk_set_interaction_status(job_id, exclude_user_id, status)
            .await?;

        tracing::debug!(%job_id, updated, status = status.to_str(), "interactions bulk updated");
        Ok(updated)
    }
}
