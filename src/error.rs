use crate::{bookings::BookingError, protocol::SimpleResponse};
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("Not authorized")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    /// The requested slot is full or falls on a closed day.
    #[error("{0}")]
    SlotUnavailable(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    Storage(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation<S: ToString>(msg: S) -> Self {
        ApiError::Validation(msg.to_string())
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::SlotUnavailable { .. } => ApiError::SlotUnavailable(
                "This time slot is no longer available, please choose another one".to_string(),
            ),
            BookingError::NotFound(_) => ApiError::NotFound("Appointment not found".to_string()),
            BookingError::Storage(err) => ApiError::Storage(err),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::SlotUnavailable(_) | ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Storage(err) = self {
            tracing::error!(error = ?err, "request failed");
        }
        HttpResponse::build(self.status_code()).json(SimpleResponse::err(self))
    }
}
