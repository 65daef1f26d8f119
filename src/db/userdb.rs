// db/userdb.rs
use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::usermodel::User;

#[async_trait]
pub trait UserExt {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error>;

    async fn update_user_rating(
        &self,
        user_id: Uuid,
        rating: f64,
        reviews_count: i32,
    ) -> Result<User, sqlx::Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, role, rating, reviews_count, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_user_rating(
        &self,
        user_id: Uuid,
        rating: f64,
        reviews_count: i32,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET rating = $2, reviews_count = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, role, rating, reviews_count, created_at
            "#,
        )
        .bind(user_id)
        .bind(rating)
        .bind(reviews_count)
        .fetch_one(&self.pool)
        .await
    }
}
