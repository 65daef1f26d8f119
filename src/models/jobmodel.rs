use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "job_lifecycle_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    Active,
    InProgress,
    Completed,
    Canceled,
    Archived,
    Rated,
}

impl LifecycleStatus {
    pub fn to_str(&self) -> &str {
        match self {
            LifecycleStatus::Active => "active",
            LifecycleStatus::InProgress => "in_progress",
            LifecycleStatus::Completed => "completed",
            LifecycleStatus::Canceled => "canceled",
            LifecycleStatus::Archived => "archived",
            LifecycleStatus::Rated => "rated",
        }
    }

    /// A professional already won the job.
    pub fn is_taken(&self) -> bool {
        matches!(
            self,
            LifecycleStatus::InProgress | LifecycleStatus::Completed | LifecycleStatus::Rated
        )
    }

    /// The job left the negotiation without ever being completed.
    pub fn is_closed(&self) -> bool {
        matches!(self, LifecycleStatus::Canceled | LifecycleStatus::Archived)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "job_tracking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    None,
    Contracted,
    Started,
    Finished,
}

impl TrackingStatus {
    pub fn to_str(&self) -> &str {
        match self {
            TrackingStatus::None => "none",
            TrackingStatus::Contracted => "contracted",
            TrackingStatus::Started => "started",
            TrackingStatus::Finished => "finished",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OfferItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OfferTerms {
    pub description: String,
    #[serde(default)]
    pub items: Vec<OfferItem>,
    pub estimated_days: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: Uuid,
    pub pro_id: Uuid,
    pub amount: f64,
    pub terms: OfferTerms,
    pub status: OfferStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    pub fn new(pro_id: Uuid, amount: f64, terms: OfferTerms) -> Self {
        let now = Utc::now();
        Offer {
            id: Uuid::new_v4(),
            pro_id,
            amount,
            terms,
            status: OfferStatus::Pending,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HistoryEventKind {
    Created,
    OfferSubmitted,
    OfferAmended,
    OfferAccepted,
    OfferRejected,
    OfferWithdrawn,
    WorkStarted,
    ClientFinished,
    ProFinished,
    Completed,
    Rated,
    Closed,
    Archived,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEvent {
    pub kind: HistoryEventKind,
    pub actor_id: Option<Uuid>,
    pub at: DateTime<Utc>,
    pub detail: Option<String>,
}

/// The job aggregate. Offers and history live inside the document and are
/// always written back as whole arrays together with a bumped `version`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub client_id: Uuid,
    pub professional_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub category_id: Option<Uuid>,
    pub budget: Option<f64>,
    pub lifecycle_status: LifecycleStatus,
    pub tracking_status: TrackingStatus,
    pub client_finished: bool,
    pub pro_finished: bool,
    pub client_rated: bool,
    pub pro_rated: bool,
    pub offers: Json<Vec<Offer>>,
    pub project_history: Json<Vec<HistoryEvent>>,
    pub hired_professional_id: Option<Uuid>,
    pub closure_reason: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(
        client_id: Uuid,
        title: String,
        description: String,
        category_id: Option<Uuid>,
        budget: Option<f64>,
    ) -> Self {
        let now = Utc::now();
        Job {
            id: Uuid::new_v4(),
            client_id,
            professional_id: None,
            title,
            description,
            category_id,
            budget,
            lifecycle_status: LifecycleStatus::Active,
            tracking_status: TrackingStatus::None,
            client_finished: false,
            pro_finished: false,
            client_rated: false,
            pro_rated: false,
            offers: Json(Vec::new()),
            project_history: Json(vec![HistoryEvent {
                kind: HistoryEventKind::Created,
                actor_id: Some(client_id),
                at: now,
                detail: None,
            }]),
            hired_professional_id: None,
            closure_reason: None,
            closed_at: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn offer_by_pro(&self, pro_id: Uuid) -> Option<&Offer> {
        self.offers.iter().find(|offer| offer.pro_id == pro_id)
    }

    pub fn accepted_offer(&self) -> Option<&Offer> {
        self.offers
            .iter()
            .find(|offer| offer.status == OfferStatus::Accepted)
    }

    pub fn has_offer_in(&self, status: OfferStatus) -> bool {
        self.offers.iter().any(|offer| offer.status == status)
    }

    /// Whether `user_id` is the professional who won the job.
    pub fn is_winner(&self, user_id: Uuid) -> bool {
        self.professional_id == Some(user_id)
            || self
                .accepted_offer()
                .map(|offer| offer.pro_id == user_id)
                .unwrap_or(false)
    }

    pub fn record(
        &mut self,
        kind: HistoryEventKind,
        actor_id: Option<Uuid>,
        detail: Option<String>,
    ) {
        let now = Utc::now();
        self.project_history.0.push(HistoryEvent {
            kind,
            actor_id,
            at: now,
            detail,
        });
        self.updated_at = now;
    }
}
