use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Client,
    Professional,
    Admin,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::Client => "client",
            UserRole::Professional => "professional",
            UserRole::Admin => "admin",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub rating: f64,
    pub reviews_count: i32,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}
