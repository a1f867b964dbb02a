use actix_web::{error, HttpResponse};
use actix_web::http::StatusCode;
use derive_more::{Display, Error};
use serde::Serialize;

use crate::server::billing::validation::BillValidationError;
use crate::server::database::store::StoreError;

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub(crate) enum ApiError {
    #[display("{_0}")]
    Validation(#[error(not(source))] String),
    #[display("{_0}")]
    Unauthorized(#[error(not(source))] &'static str),
    #[display("Resource not found")]
    NotFound,
    #[display("Database connection failed")]
    StorageUnavailable,
    #[display("Database operation timed out")]
    Timeout,
    #[display("Database error")]
    DbError,
    #[display("Internal server error")]
    Internal,
}

/// Failure body shared by every endpoint.
#[derive(Debug, Serialize)]
struct FailureResponse {
    success: bool,
    message: String,
}

impl error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match *self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::DbError | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(FailureResponse {
            success: false,
            message: self.to_string(),
        })
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable => ApiError::StorageUnavailable,
            StoreError::Timeout => ApiError::Timeout,
            StoreError::Query(_) => ApiError::DbError,
        }
    }
}

impl From<BillValidationError> for ApiError {
    fn from(e: BillValidationError) -> Self {
        ApiError::Validation(e.to_string())
    }
}
