// service/test_support.rs
use std::sync::Arc;

use crate::{
    db::{memory::MemoryStore, MarketStore},
    models::{
        jobmodel::Job,
        usermodel::{User, UserRole},
    },
    service::{
        audit_service::AuditService, chat_link::ChatLinkage, completion_service::CompletionService,
        hooks::PostCommitHooks, interaction_service::InteractionTracker, job_service::JobService,
        notification_service::NotificationService, offer_service::OfferService,
    },
};

/// Services wired over an in-memory store, the same way `AppState` wires them.
pub struct TestServices {
    pub store: Arc<MemoryStore>,
    pub jobs: JobService,
    pub offers: OfferService,
    pub completion: CompletionService,
    pub interactions: InteractionTracker,
}

impl TestServices {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let db_client: Arc<dyn MarketStore> = store.clone();

        let interactions = InteractionTracker::new(db_client.clone());
        let hooks = Arc::new(PostCommitHooks::new(
            interactions.clone(),
            ChatLinkage::new(db_client.clone()),
            NotificationService::new(db_client.clone()),
        ));
        let audit_service = Arc::new(AuditService::new());

        Self {
            jobs: JobService::new(
                db_client.clone(),
                interactions.clone(),
                hooks.clone(),
                audit_service.clone(),
            ),
            offers: OfferService::new(db_client.clone(), hooks.clone(), audit_service.clone()),
            completion: CompletionService::new(db_client, hooks, audit_service),
            interactions,
            store,
        }
    }

    pub fn client(&self, name: &str) -> User {
        self.store.add_user(name, UserRole::Client)
    }

    pub fn professional(&self, name: &str) -> User {
        self.store.add_user(name, UserRole::Professional)
    }

    pub fn admin(&self, name: &str) -> User {
        self.store.add_user(name, UserRole::Admin)
    }

    pub async fn posted_job(&self, client: &User) -> Job {
        self.jobs
            .create(
                client,
                format!("Job for {}", client.name),
                "Fix the kitchen tap and check the boiler".to_string(),
                None,
                Some(250.0),
            )
            .await
            .expect("job creation")
    }
}
