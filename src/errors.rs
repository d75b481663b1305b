use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::domain::errors::DomainError;

const INTERNAL_MESSAGE: &str = "An internal error occurred, please try again later.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        let msg = e.to_string();
        match e {
            DomainError::OrderNotFound(_) | DomainError::ProductNotFound(_) => {
                AppError::NotFound(msg)
            }
            DomainError::Validation(m) => AppError::BadRequest(m),
            DomainError::OrderCanceled => AppError::BadRequest(msg),
            DomainError::InvalidState(_)
            | DomainError::InsufficientStock { .. }
            | DomainError::ConcurrentModification { .. }
            | DomainError::DuplicateSku(_) => AppError::Conflict(msg),
            DomainError::Internal(m) => AppError::Internal(m),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Binds the error to the request it answers.
    pub fn at(self, req: &HttpRequest) -> ApiError {
        ApiError {
            error: self,
            details: format!("uri={}", req.path()),
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    /// `uri=<request path>`
    pub details: String,
}

#[derive(Debug, Error)]
#[error("{error}")]
pub struct ApiError {
    pub error: AppError,
    pub details: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.error.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let message = match &self.error {
            AppError::Internal(msg) => {
                log::error!("{}: {}", self.details, msg);
                INTERNAL_MESSAGE.to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody {
            timestamp: Utc::now(),
            message,
            details: self.details.clone(),
        })
    }
}
