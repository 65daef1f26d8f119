use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "interaction_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InteractionStatus {
    New,
    Viewed,
    Contacted,
    Offered,
    Won,
    Lost,
    Rejected,
    Archived,
}

impl InteractionStatus {
    pub fn to_str(&self) -> &str {
        match self {
            InteractionStatus::New => "new",
            InteractionStatus::Viewed => "viewed",
            InteractionStatus::Contacted => "contacted",
            InteractionStatus::Offered => "offered",
            InteractionStatus::Won => "won",
            InteractionStatus::Lost => "lost",
            InteractionStatus::Rejected => "rejected",
            InteractionStatus::Archived => "archived",
        }
    }

    /// Statuses a professional may report directly. The rest are set by
    /// offer, assignment and close side effects.
    pub fn is_self_reported(&self) -> bool {
        matches!(
            self,
            InteractionStatus::New | InteractionStatus::Viewed | InteractionStatus::Contacted
        )
    }
}

// One row per (job, professional); overwritten in place, no history.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: Uuid,
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub status: InteractionStatus,
    pub has_unread: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InteractionCounts {
    pub viewed: i64,
    pub contacted: i64,
    pub offered: i64,
    pub total: i64,
}

impl InteractionCounts {
    pub fn tally(interactions: &[Interaction]) -> Self {
        let count = |status: InteractionStatus| {
            interactions.iter().filter(|i| i.status == status).count() as i64
        };

        InteractionCounts {
            viewed: count(InteractionStatus::Viewed),
            contacted: count(InteractionStatus::Contacted),
            offered: count(InteractionStatus::Offered),
            total: interactions.len() as i64,
        }
    }
}
