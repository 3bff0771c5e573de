use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use orderpulse_core::error::CoreError;
use serde::Serialize;

/// Error returned by HTTP handlers.
///
/// Rendered as `{"error": ..., "code": ...}`. Database and internal failures
/// are logged and reported to the client with a generic message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Malformed query or body that passed deserialization.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

const INTERNAL_MESSAGE: &str = "An internal error occurred";

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Core(CoreError::NotFound { .. }) | Self::Database(sqlx::Error::RowNotFound) => {
                StatusCode::NOT_FOUND
            }
            Self::Core(CoreError::Validation(_)) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Core(CoreError::Internal(_)) | Self::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Machine-readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Core(CoreError::NotFound { .. }) | Self::Database(sqlx::Error::RowNotFound) => {
                "NOT_FOUND"
            }
            Self::Core(CoreError::Validation(_)) => "VALIDATION_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Core(CoreError::Internal(_)) | Self::Database(_) => "INTERNAL_ERROR",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Core(CoreError::NotFound { entity, id }) => {
                format!("{entity} with id {id} not found")
            }
            Self::Core(CoreError::Validation(msg)) | Self::BadRequest(msg) => msg.clone(),
            Self::Database(sqlx::Error::RowNotFound) => "Resource not found".to_string(),
            Self::Core(CoreError::Internal(_)) | Self::Database(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorBody {
            error: self.client_message(),
            code: self.code(),
        };
        (status, Json(body)).into_response()
    }
}
