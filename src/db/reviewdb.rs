// db/reviewdb.rs
use async_trait::async_trait;
use sqlx::{types::Json, Error, Row};
use uuid::Uuid;

use super::db::DBClient;
use crate::models::reviewmodel::*;

#[async_trait]
pub trait ReviewExt {
    async fn get_review(
        &self,
        job_id: Uuid,
        reviewer_id: Uuid,
        reviewee_id: Uuid,
    ) -> Result<Option<Review>, Error>;

    async fn create_review(
        &self,
        job_id: Uuid,
        reviewer_id: Uuid,
        reviewee_id: Uuid,
        reviewer_role: ReviewerRole,
        rating: i32,
        answers: ReviewAnswers,
        comment: String,
    ) -> Result<Review, Error>;

    async fn job_has_reviews(&self, job_id: Uuid) -> Result<bool, Error>;

    /// The subset of `job_ids` that has at least one review.
    async fn get_reviewed_job_ids(&self, job_ids: &[Uuid]) -> Result<Vec<Uuid>, Error>;

    /// Mean and count of the reviews `reviewee_id` received from `reviewer_role`.
    async fn get_rating_aggregate(
        &self,
        reviewee_id: Uuid,
        reviewer_role: ReviewerRole,
    ) -> Result<RatingAggregate, Error>;
}

#[async_trait]
impl ReviewExt for DBClient {
    async fn get_review(
        &self,
        job_id: Uuid,
        reviewer_id: Uuid,
        reviewee_id: Uuid,
    ) -> Result<Option<Review>, Error> {
        sqlx::query_as::<_, Review>(
            r#"
            SELECT id, job_id, reviewer_id, reviewee_id, reviewer_role, rating,
                   answers, comment, created_at
            FROM reviews
            WHERE job_id = $1 AND reviewer_id = $2 AND reviewee_id = $3
            "#,
        )
        .bind(job_id)
        .bind(reviewer_id)
        .bind(reviewee_id)
        .fetch_optional(&self.pool)
        .await
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
        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews
            (id, job_id, reviewer_id, reviewee_id, reviewer_role, rating, answers, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            RETURNING id, job_id, reviewer_id, reviewee_id, reviewer_role, rating,
                      answers, comment, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(job_id)
        .bind(reviewer_id)
        .bind(reviewee_id)
        .bind(reviewer_role)
        .bind(rating)
        .bind(Json(answers))
        .bind(comment)
        .fetch_one(&self.pool)
        .await
    }

    async fn job_has_reviews(&self, job_id: Uuid) -> Result<bool, Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE job_id = $1)",
        )
        .bind(job_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_reviewed_job_ids(&self, job_ids: &[Uuid]) -> Result<Vec<Uuid>, Error> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT DISTINCT job_id FROM reviews WHERE job_id = ANY($1)",
        )
        .bind(job_ids)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_rating_aggregate(
        &self,
        reviewee_id: Uuid,
        reviewer_role: ReviewerRole,
    ) -> Result<RatingAggregate, Error> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(AVG(rating)::DOUBLE PRECISION, 0) AS rating,
                   COUNT(*)::INT AS reviews_count
            FROM reviews
            WHERE reviewee_id = $1 AND reviewer_role = $2
            "#,
        )
        .bind(reviewee_id)
        .bind(reviewer_role)
        .fetch_one(&self.pool)
        .await?;

        Ok(RatingAggregate {
            rating: row.try_get("rating")?,
            reviews_count: row.try_get("reviews_count")?,
        })
    }
}
