// db/memory.rs
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{types::Json, Error};
use uuid::Uuid;

use super::{
    chatdb::ChatExt, interactiondb::InteractionExt, jobdb::JobExt,
    notificationdb::NotificationExt, reviewdb::ReviewExt, userdb::UserExt,
};
use crate::models::{
    chatmodels::*, interactionmodel::*, jobmodel::*, notificationmodel::Notification,
    reviewmodel::*, usermodel::*,
};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    jobs: HashMap<Uuid, Job>,
    interactions: Vec<Interaction>,
    conversations: Vec<Conversation>,
    messages: Vec<ChatMessage>,
    reviews: Vec<Review>,
    notifications: Vec<Notification>,
}

/// In-memory store with the same contract as `DBClient`, including the
/// version check on `replace_job`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    fail_interactions: Mutex<bool>,
    fail_rating_updates: Mutex<bool>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory store poisoned")
    }

    pub fn add_user(&self, name: &str, role: UserRole) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role,
            rating: 0.0,
            reviews_count: 0,
            created_at: Utc::now(),
        };
        self.lock().users.insert(user.id, user.clone());
        user
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().messages.clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    pub fn interactions(&self, job_id: Uuid) -> Vec<Interaction> {
        self.lock()
            .interactions
            .iter()
            .filter(|interaction| interaction.job_id == job_id)
            .cloned()
            .collect()
    }

    /// Rewrites a stored job as a concurrent writer would, bumping its version.
    pub fn overwrite_job(&self, job_id: Uuid, change: impl FnOnce(&mut Job)) {
        let mut state = self.lock();
        if let Some(job) = state.jobs.get_mut(&job_id) {
            change(job);
            job.version += 1;
        }
    }

    /// Makes every interaction write fail, to exercise best-effort hooks.
    pub fn fail_interaction_writes(&self) {
        *self.fail_interactions.lock().expect("memory store poisoned") = true;
    }

    /// Toggles failure of `update_user_rating`, for steps after a review insert.
    pub fn set_rating_updates_failing(&self, failing: bool) {
        *self.fail_rating_updates.lock().expect("memory store poisoned") = failing;
    }

    fn interactions_failing(&self) -> bool {
        *self.fail_interactions.lock().expect("memory store poisoned")
    }
}

#[async_trait]
impl JobExt for MemoryStore {
    async fn insert_job(&self, job: &Job) -> Result<Job, Error> {
        self.lock().jobs.insert(job.id, job.clone());
        Ok(job.clone())
    }

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, Error> {
        Ok(self.lock().jobs.get(&job_id).cloned())
    }

    async fn get_jobs_by_client(&self, client_id: Uuid) -> Result<Vec<Job>, Error> {
        Ok(self
            .lock()
            .jobs
            .values()
            .filter(|job| job.client_id == client_id)
            .cloned()
            .collect())
    }

    async fn get_jobs_for_professional(&self, pro_id: Uuid) -> Result<Vec<Job>, Error> {
        let state = self.lock();
        Ok(state
            .jobs
            .values()
            .filter(|job| {
                job.lifecycle_status == LifecycleStatus::Active
                    || job.professional_id == Some(pro_id)
                    || job.offer_by_pro(pro_id).is_some()
                    || state
                        .interactions
                        .iter()
                        .any(|i| i.job_id == job.id && i.user_id == pro_id)
            })
            .cloned()
            .collect())
    }

    async fn get_all_jobs(&self) -> Result<Vec<Job>, Error> {
        Ok(self.lock().jobs.values().cloned().collect())
    }

    async fn replace_job(&self, job: &Job) -> Result<Option<Job>, Error> {
        let mut state = self.lock();
        let Some(current) = state.jobs.get(&job.id) else {
            return Ok(None);
        };
        if current.version != job.version {
            return Ok(None);
        }

        let mut stored = job.clone();
        stored.version += 1;
        stored.updated_at = Utc::now();
        state.jobs.insert(stored.id, stored.clone());
        Ok(Some(stored))
    }

    async fn delete_job(&self, job_id: Uuid) -> Result<bool, Error> {
        let mut state = self.lock();
        state.interactions.retain(|i| i.job_id != job_id);
        let conversation_ids: Vec<Uuid> = state
            .conversations
            .iter()
            .filter(|c| c.job_id == job_id)
            .map(|c| c.id)
            .collect();
        state
            .messages
            .retain(|m| !conversation_ids.contains(&m.conversation_id));
        state.conversations.retain(|c| c.job_id != job_id);
        Ok(state.jobs.remove(&job_id).is_some())
    }
}

#[async_trait]
impl InteractionExt for MemoryStore {
    async fn upsert_interaction(
        &self,
        job_id: Uuid,
        user_id: Uuid,
        status: InteractionStatus,
        has_unread: bool,
    ) -> Result<Interaction, Error> {
        if self.interactions_failing() {
            return Err(Error::PoolTimedOut);
        }

        let mut state = self.lock();
        let now = Utc::now();
        if let Some(existing) = state
            .interactions
            .iter_mut()
            .find(|i| i.job_id == job_id && i.user_id == user_id)
        {
            existing.status = status;
            existing.has_unread = has_unread;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let interaction = Interaction {
            id: Uuid::new_v4(),
            job_id,
            user_id,
            status,
            has_unread,
            updated_at: now,
        };
        state.interactions.push(interaction.clone());
        Ok(interaction)
    }

    async fn get_job_interactions(&self, job_id: Uuid) -> Result<Vec<Interaction>, Error> {
        Ok(self.interactions(job_id))
    }

    async fn get_interactions_for_jobs(&self, job_ids: &[Uuid]) -> Result<Vec<Interaction>, Error> {
        Ok(self
            .lock()
            .interactions
            .iter()
            .filter(|interaction| job_ids.contains(&interaction.job_id))
            .cloned()
            .collect())
    }

    async fn count_interactions_by_status(&self, job_id: Uuid) -> Result<InteractionCounts, Error> {
        Ok(InteractionCounts::tally(&self.interactions(job_id)))
    }

    async fn bulk_set_interaction_status(
        &self,
        job_id: Uuid,
        exclude_user_id: Uuid,
        status: InteractionStatus,
    ) -> Result<u64, Error> {
        if self.interactions_failing() {
            return Err(Error::PoolTimedOut);
        }

        let mut state = self.lock();
        let mut updated = 0;
        for interaction in state
            .interactions
            .iter_mut()
            .filter(|i| i.job_id == job_id && i.user_id != exclude_user_id)
        {
            interaction.status = status;
            interaction.updated_at = Utc::now();
            updated += 1;
        }
        Ok(updated)
    }
}

#[async_trait]
impl ChatExt for MemoryStore {
    async fn get_conversation(
        &self,
        job_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Option<Conversation>, Error> {
        Ok(self
            .lock()
            .conversations
            .iter()
            .find(|c| c.job_id == job_id && c.professional_id == professional_id)
            .cloned())
    }

    async fn create_or_get_conversation(
        &self,
        job_id: Uuid,
        client_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Conversation, Error> {
        let mut state = self.lock();
        if let Some(existing) = state
            .conversations
            .iter()
            .find(|c| c.job_id == job_id && c.professional_id == professional_id)
        {
            return Ok(existing.clone());
        }

        let conversation = Conversation {
            id: Uuid::new_v4(),
            job_id,
            client_id,
            professional_id,
            message_count: 0,
            last_message_at: None,
            created_at: Utc::now(),
        };
        state.conversations.push(conversation.clone());
        Ok(conversation)
    }

    async fn post_system_message(
        &self,
        conversation_id: Uuid,
        body: String,
    ) -> Result<ChatMessage, Error> {
        let mut state = self.lock();
        let message = ChatMessage {
            id: Uuid::new_v4(),
            conversation_id,
            sender_id: None,
            body,
            created_at: Utc::now(),
        };

        let conversation = state
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .ok_or(Error::RowNotFound)?;
        conversation.message_count += 1;
        conversation.last_message_at = Some(message.created_at);

        state.messages.push(message.clone());
        Ok(message)
    }

    async fn get_job_conversations(&self, job_id: Uuid) -> Result<Vec<Conversation>, Error> {
        Ok(self
            .lock()
            .conversations
            .iter()
            .filter(|c| c.job_id == job_id)
            .cloned()
            .collect())
    }

    async fn get_conversations_for_jobs(
        &self,
        job_ids: &[Uuid],
    ) -> Result<Vec<Conversation>, Error> {
        Ok(self
            .lock()
            .conversations
            .iter()
            .filter(|c| job_ids.contains(&c.job_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReviewExt for MemoryStore {
    async fn get_review(
        &self,
        job_id: Uuid,
        reviewer_id: Uuid,
        reviewee_id: Uuid,
    ) -> Result<Option<Review>, Error> {
        Ok(self
            .lock()
            .reviews
            .iter()
            .find(|r| {
                r.job_id == job_id && r.reviewer_id == reviewer_id && r.reviewee_id == reviewee_id
            })
            .cloned())
    }

    async fn create_review(
        &self,
        job_id: Uuid,
        reviewer_id: Uuid,
        reviewee_id: Uuid,
        reviewer_role: ReviewerRole,
        rating: i32,
        answers: ReviewAnswers,
        comment: String,
    ) -> Result<Review, Error> {
        let review = Review {
            id: Uuid::new_v4(),
            job_id,
            reviewer_id,
            reviewee_id,
            reviewer_role,
            rating,
            answers: Json(answers),
            comment,
            created_at: Utc::now(),
        };
        self.lock().reviews.push(review.clone());
        Ok(review)
    }

    async fn job_has_reviews(&self, job_id: Uuid) -> Result<bool, Error> {
        Ok(self.lock().reviews.iter().any(|r| r.job_id == job_id))
    }

    async fn get_reviewed_job_ids(&self, job_ids: &[Uuid]) -> Result<Vec<Uuid>, Error> {
        let mut reviewed: Vec<Uuid> = self
            .lock()
            .reviews
            .iter()
            .map(|r| r.job_id)
            .filter(|job_id| job_ids.contains(job_id))
            .collect();
        reviewed.sort();
        reviewed.dedup();
        Ok(reviewed)
    }

    async fn get_rating_aggregate(
        &self,
        reviewee_id: Uuid,
        reviewer_role: ReviewerRole,
    ) -> Result<RatingAggregate, Error> {
        let state = self.lock();
        let ratings: Vec<i32> = state
            .reviews
            .iter()
            .filter(|r| r.reviewee_id == reviewee_id && r.reviewer_role == reviewer_role)
            .map(|r| r.rating)
            .collect();

        let rating = if ratings.is_empty() {
            0.0
        } else {
            ratings.iter().sum::<i32>() as f64 / ratings.len() as f64
        };

        Ok(RatingAggregate {
            rating,
            reviews_count: ratings.len() as i32,
        })
    }
}

#[async_trait]
impl UserExt for MemoryStore {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        Ok(self.lock().users.get(&user_id).cloned())
    }

    async fn update_user_rating(
        &self,
        user_id: Uuid,
        rating: f64,
        reviews_count: i32,
    ) -> Result<User, Error> {
        if *self.fail_rating_updates.lock().expect("memory store poisoned") {
            return Err(Error::PoolTimedOut);
        }
        let mut state = self.lock();
        let user = state.users.get_mut(&user_id).ok_or(Error::RowNotFound)?;
        user.rating = rating;
        user.reviews_count = reviews_count;
        Ok(user.clone())
    }
}

#[async_trait]
impl NotificationExt for MemoryStore {
    async fn store_notification(
        &self,
        user_id: Uuid,
        kind: String,
        job_id: Option<Uuid>,
        message: String,
        metadata: Option<serde_json::Value>,
    ) -> Result<Notification, Error> {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id,
            kind,
            job_id,
            message,
            metadata,
            created_at: Utc::now(),
        };
        self.lock().notifications.push(notification.clone());
        Ok(notification)
    }
}
