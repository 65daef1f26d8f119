use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "reviewer_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReviewerRole {
    Client,
    Professional,
}

impl ReviewerRole {
    pub fn to_str(&self) -> &str {
        match self {
            ReviewerRole::Client => "client",
            ReviewerRole::Professional => "professional",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAnswers {
    pub punctuality: Option<i32>,
    pub quality: Option<i32>,
    pub communication: Option<i32>,
    pub would_repeat: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub job_id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
    pub reviewer_role: ReviewerRole,
    pub rating: i32,
    pub answers: Json<ReviewAnswers>,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct RatingAggregate {
    pub rating: f64,
    pub reviews_count: i32,
}
