// service/chat_link.rs
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::MarketStore,
    models::{chatmodels::Conversation, jobmodel::Job},
    service::error::ServiceError,
};

/// Keeps one conversation per (job, professional) and drops system notes into it.
#[derive(Debug, Clone)]
pub struct ChatLinkage {
    db_client: Arc<dyn MarketStore>,
}

impl ChatLinkage {
    pub fn new(db_client: Arc<dyn MarketStore>) -> Self {
        Self { db_client }
    }

    pub async fn ensure_conversation(
        &self,
        job: &Job,
        professional_id: Uuid,
    ) -> Result<Conversation, ServiceError> {
        Ok(self
            .db_client
            .create_or_get_conversation(job.id, job.client_id, professional_id)
            .await?)
    }

    pub async fn post_offer_summary(
        &self,
        job: &Job,
        professional_id: Uuid,
        amount: f64,
    ) -> Result<(), ServiceError> {
        let conversation = self.ensure_conversation(job, professional_id).await?;
        self.db_client
            .post_system_message(conversation.id, format!("New offer submitted: {:.2}", amount))
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{chatdb::ChatExt, memory::MemoryStore};

    #[tokio::test]
    async fn repeated_offers_share_one_conversation() {
        let store = Arc::new(MemoryStore::default());
        let chat = ChatLinkage::new(store.clone());
        let job = Job::new(Uuid::new_v4(), "Garden".into(), "Trim hedges".into(), None, None);
        let pro = Uuid::new_v4();

        chat.post_offer_summary(&job, pro, 120.0).await.unwrap();
        chat.post_offer_summary(&job, pro, 95.5).await.unwrap();

        let conversations = store.get_job_conversations(job.id).await.unwrap();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].message_count, 2);

        let bodies: Vec<String> = store.messages().into_iter().map(|m| m.body).collect();
        assert_eq!(bodies, vec!["New offer submitted: 120.00", "New offer submitted: 95.50"]);
    }
}
