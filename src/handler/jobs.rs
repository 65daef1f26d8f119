// handler/jobs.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::jobdtos::*,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn jobs_handler() -> Router {
    Router::new()
        .route("/", post(create_job).get(list_jobs))
        .route("/:job_id", get(get_job))
        .route("/:job_id/offers", post(submit_offer).put(amend_offer))
        .route("/:job_id/offers/:target_id", delete(delete_offer))
        .route("/:job_id/offers/:target_id/reject", put(reject_offer))
        .route("/:job_id/assign", put(assign_professional))
        .route("/:job_id/start", put(confirm_start))
        .route("/:job_id/finish", put(finish_job))
        .route("/:job_id/rate-mutual", post(rate_mutual))
        .route("/:job_id/interaction", post(track_interaction))
        .route("/:job_id/interactions/summary", get(interaction_summary))
        .route("/:job_id/close", put(close_job))
        .route("/:job_id/archive", put(archive_job))
}

pub async fn create_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .job_service
        .create(&auth.user, body.title, body.description, body.category_id, body.budget)
        .await?;
    let view = app_state.job_service.decorate(job, &auth.user).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Job created successfully", view)),
    ))
}

pub async fn list_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state.job_service.list_views(&auth.user).await?;

    Ok(Json(ApiResponse::success("Jobs retrieved successfully", jobs)))
}

pub async fn get_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let view = app_state.job_service.get_view(&auth.user, job_id).await?;

    Ok(Json(ApiResponse::success("Job retrieved successfully", view)))
}

pub async fn submit_offer(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<SubmitOfferDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .offer_service
        .submit(&auth.user, job_id, body.amount, body.terms())
        .await?;
    let view = app_state.job_service.decorate(job, &auth.user).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Offer submitted successfully", view)),
    ))
}

pub async fn amend_offer(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<SubmitOfferDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .offer_service
        .amend(&auth.user, job_id, body.amount, body.terms())
        .await?;
    let view = app_state.job_service.decorate(job, &auth.user).await?;

    Ok(Json(ApiResponse::success("Offer updated successfully", view)))
}

pub async fn assign_professional(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<AssignProfessionalDto>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .offer_service
        .accept(&auth.user, job_id, body.professional_id)
        .await?;
    let view = app_state.job_service.decorate(job, &auth.user).await?;

    Ok(Json(ApiResponse::success("Professional assigned successfully", view)))
}

pub async fn reject_offer(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path((job_id, pro_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<RejectOfferDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .offer_service
        .reject(&auth.user, job_id, pro_id, body.reason)
        .await?;
    let view = app_state.job_service.decorate(job, &auth.user).await?;

    Ok(Json(ApiResponse::success("Offer rejected", view)))
}

pub async fn delete_offer(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path((job_id, offer_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpError> {
    let job_id = app_state
        .offer_service
        .withdraw(&auth.user, job_id, offer_id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Offer deleted successfully",
        JobIdResponse { job_id },
    )))
}

pub async fn confirm_start(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .completion_service
        .confirm_start(&auth.user, job_id)
        .await?;
    let view = app_state.job_service.decorate(job, &auth.user).await?;

    Ok(Json(ApiResponse::success("Work started", view)))
}

pub async fn finish_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .completion_service
        .finish(&auth.user, job_id)
        .await?;
    let view = app_state.job_service.decorate(job, &auth.user).await?;

    Ok(Json(ApiResponse::success("Job marked as finished", view)))
}

pub async fn rate_mutual(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<RateMutualDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let review = app_state
        .completion_service
        .rate_mutual(
            &auth.user,
            job_id,
            body.reviewee_id,
            body.rating,
            body.comment,
            body.answers.into(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Review submitted successfully", review)),
    ))
}

pub async fn track_interaction(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<InteractionDto>,
) -> Result<impl IntoResponse, HttpError> {
    let interaction = app_state
        .interaction_tracker
        .track(&auth.user, job_id, body.status, body.has_unread)
        .await?;

    Ok(Json(ApiResponse::success("Interaction recorded", interaction)))
}

pub async fn interaction_summary(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let counts = app_state
        .job_service
        .interaction_summary(&auth.user, job_id)
        .await?;

    Ok(Json(ApiResponse::success("Interaction summary retrieved", counts)))
}

pub async fn close_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
    Json(body): Json<CloseJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state
        .job_service
        .close(&auth.user, job_id, body.reason)
        .await?;
    let view = app_state.job_service.decorate(job, &auth.user).await?;

    Ok(Json(ApiResponse::success("Job closed", view)))
}

pub async fn archive_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.job_service.archive(&auth.user, job_id).await?;
    let view = app_state.job_service.decorate(job, &auth.user).await?;

    Ok(Json(ApiResponse::success("Job archived", view)))
}
