//! Application error handling

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ficha_core::ClinicalError;
use serde::{Deserialize, Serialize};

/// JSON body returned for every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(status: StatusCode, error: &str, message: &str) -> Self {
        Self {
            status: status.as_u16(),
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ErrorBody {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
    /// A use-case failure, mapped by its kind
    #[error(transparent)]
    Clinical(#[from] ClinicalError),
}

impl AppError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad-request"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not-found"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
            AppError::Clinical(err) => {
                let status = match err {
                    ClinicalError::Validation(_) | ClinicalError::InvalidArgument(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    ClinicalError::NotFound(_) => StatusCode::NOT_FOUND,
                    ClinicalError::Conflict(_) => StatusCode::CONFLICT,
                    ClinicalError::NumberExhausted { .. }
                    | ClinicalError::Store(_)
                    | ClinicalError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.kind())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();

        if status.is_server_error() {
            tracing::error!(error = %self, kind, "Request failed");
        } else {
            tracing::debug!(error = %self, kind, "Request rejected");
        }

        ErrorBody::new(status, kind, &self.to_string()).into_response()
    }
}
