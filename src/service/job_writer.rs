// service/job_writer.rs
use uuid::Uuid;

use crate::{
    db::MarketStore,
    models::jobmodel::Job,
    service::error::ServiceError,
};

const MAX_WRITE_ATTEMPTS: usize = 5;

/// Result of a guarded job write. `changed` is false when the mutation found
/// nothing to do and the stored document was left untouched.
#[derive(Debug, Clone)]
pub struct JobWrite {
    pub job: Job,
    pub changed: bool,
}

/// Read-modify-write of a whole job document guarded by its version.
///
/// `apply` receives a fresh copy on every attempt, so preconditions checked
/// inside it always run against the state that is actually replaced. It
/// returns `Ok(false)` to signal a no-op. When another writer wins the race
/// the job is re-read and `apply` runs again; after `MAX_WRITE_ATTEMPTS`
/// lost races the caller gets `ConcurrentModification`.
pub async fn mutate_job<F>(
    store: &dyn MarketStore,
    job_id: Uuid,
    mut apply: F,
) -> Result<JobWrite, ServiceError>
where
    F: FnMut(&mut Job) -> Result<bool, ServiceError> + Send,
{
    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let mut job = store
            .get_job_by_id(job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        if !apply(&mut job)? {
            return Ok(JobWrite { job, changed: false });
        }

        match store.replace_job(&job).await? {
            Some(job) => return Ok(JobWrite { job, changed: true }),
            None => {
                tracing::debug!(%job_id, attempt, "job version moved, retrying write");
            }
        }
    }

    tracing::warn!(%job_id, "giving up on job write after repeated version conflicts");
    Err(ServiceError::ConcurrentModification(job_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use assert_matches::assert_matches;

    use crate::{
        db::{jobdb::JobExt, memory::MemoryStore},
        models::jobmodel::{HistoryEventKind, LifecycleStatus},
    };

    async fn seeded() -> (Arc<MemoryStore>, Job) {
        let store = Arc::new(MemoryStore::default());
        let job = Job::new(Uuid::new_v4(), "Fix sink".into(), "Leaking trap".into(), None, None);
        store.insert_job(&job).await.unwrap();
        (store, job)
    }

    #[tokio::test]
    async fn applies_change_and_bumps_version() {
        let (store, job) = seeded().await;

        let write = mutate_job(store.as_ref(), job.id, |job| {
            job.lifecycle_status = LifecycleStatus::Archived;
            job.record(HistoryEventKind::Archived, None, None);
            Ok(true)
        })
        .await
        .unwrap();

        assert!(write.changed);
        assert_eq!(write.job.version, job.version + 1);
        let stored = store.get_job_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(stored.lifecycle_status, LifecycleStatus::Archived);
        assert_eq!(stored.project_history.len(), 2);
    }

    #[tokio::test]
    async fn no_op_leaves_document_untouched() {
        let (store, job) = seeded().await;

        let write = mutate_job(store.as_ref(), job.id, |_| Ok(false)).await.unwrap();

        assert!(!write.changed);
        let stored = store.get_job_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(stored.version, job.version);
    }

    #[tokio::test]
    async fn retries_after_losing_a_race() {
        let (store, job) = seeded().await;
        let mut raced = false;

        let write = mutate_job(store.as_ref(), job.id, |job| {
            if !raced {
                raced = true;
                store.overwrite_job(job.id, |stored| {
                    stored.closure_reason = Some("other writer".into());
                });
            }
            job.budget = Some(50.0);
            Ok(true)
        })
        .await
        .unwrap();

        assert!(write.changed);
        assert_eq!(write.job.version, job.version + 2);
        assert_eq!(write.job.closure_reason.as_deref(), Some("other writer"));
        assert_eq!(write.job.budget, Some(50.0));
    }

    #[tokio::test]
    async fn missing_job_is_not_found() {
        let store = MemoryStore::default();
        let missing = Uuid::new_v4();

        let result = mutate_job(&store, missing, |_| Ok(true)).await;
        assert_matches!(result, Err(ServiceError::JobNotFound(id)) if id == missing);
    }

    #[tokio::test]
    async fn precondition_errors_abort_without_writing() {
        let (store, job) = seeded().await;

        let result = mutate_job(store.as_ref(), job.id, |_| {
            Err(ServiceError::Validation("nope".into()))
        })
        .await;

        assert_matches!(result, Err(ServiceError::Validation(_)));
        let stored = store.get_job_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(stored.version, job.version);
    }
}
