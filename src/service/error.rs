use thiserror::Error;
use uuid::Uuid;
use crate::{
    models::jobmodel::LifecycleStatus,
    error::{ErrorMessage, HttpError},
};
use axum::http::StatusCode;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Job {0} not found")]
    JobNotFound(Uuid),

    #[error("Offer {0} not found")]
    OfferNotFound(Uuid),

    #[error("Professional {0} has no offer on job {1}")]
    NoOfferFromProfessional(Uuid, Uuid),

    #[error("Job {0} is not in a valid status for this action (currently {1:?})")]
    InvalidJobStatus(Uuid, LifecycleStatus),

    #[error("Job {0} already has an assigned professional")]
    JobAlreadyAssigned(Uuid),

    #[error("User {0} is not authorized to perform this action on job {1}")]
    UnauthorizedJobAccess(Uuid, Uuid),

    #[error("Professional {0} already submitted an offer for job {1}")]
    DuplicateOffer(Uuid, Uuid),

    #[error("User {0} already reviewed this counterpart on job {1}")]
    DuplicateReview(Uuid, Uuid),

    #[error("Job {0} was modified concurrently, please retry")]
    ConcurrentModification(Uuid),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        if status.is_server_error() {
            tracing::error!(error = %error, "request failed");
            return HttpError::server_error(ErrorMessage::ServerError.to_string());
        }

        HttpError::new(error.to_string(), status)
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::JobNotFound(_)
            | ServiceError::OfferNotFound(_)
            | ServiceError::NoOfferFromProfessional(_, _) => StatusCode::NOT_FOUND,

            ServiceError::InvalidJobStatus(_, _)
            | ServiceError::JobAlreadyAssigned(_)
            | ServiceError::DuplicateOffer(_, _)
            | ServiceError::DuplicateReview(_, _)
            | ServiceError::ConcurrentModification(_)
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::UnauthorizedJobAccess(_, _) => StatusCode::FORBIDDEN,

            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
