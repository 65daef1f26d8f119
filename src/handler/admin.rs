// handler/admin.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    middleware,
    response::IntoResponse,
    routing::{delete, get},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    dtos::jobdtos::{ApiResponse, JobIdResponse},
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
    AppState,
};

pub fn admin_handler() -> Router {
    Router::new()
        .route("/jobs/:job_id", delete(delete_job))
        .route("/jobs/:job_id/statuses", get(job_statuses))
        .layer(middleware::from_fn(|state, req, next| {
            role_check(state, req, next, vec![UserRole::Admin])
        }))
}

pub async fn job_statuses(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let statuses = app_state.job_service.admin_statuses(job_id).await?;

    Ok(Json(ApiResponse::success("Job statuses retrieved", statuses)))
}

pub async fn delete_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    app_state.job_service.admin_delete(&auth.user, job_id).await?;

    Ok(Json(ApiResponse::success(
        "Job deleted successfully",
        JobIdResponse { job_id },
    )))
}
