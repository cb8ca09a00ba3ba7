use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docgate::{AuthError, PipelineError, ProviderError, StorageError};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Missing or rejected bearer token. The message is returned verbatim.
    #[error("{0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Only available in dev mode with tx_signature={0}")]
    DevBypassRefused(&'static str),

    #[error("{0}")]
    Auth(AuthError),

    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServerError::BadRequest(_) | ServerError::DevBypassRefused(_) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Auth(err) if err.is_verification_failure() => StatusCode::UNAUTHORIZED,
            ServerError::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Provider(err) => match err {
                ProviderError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                ProviderError::Status { .. }
                | ProviderError::Transport { .. }
                | ProviderError::InvalidResponse { .. } => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Storage(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Storage(_) | ServerError::Internal(_) | ServerError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::Unauthorized(_) => "UNAUTHORIZED",
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ServerError::DevBypassRefused(_) => "DEV_BYPASS_REFUSED",
            ServerError::Auth(_) => "AUTH_ERROR",
            ServerError::Provider(err) => match err {
                ProviderError::MissingCredential { .. } => "MISSING_CREDENTIAL",
                ProviderError::Timeout { .. } => "PROVIDER_TIMEOUT",
                ProviderError::InvalidConfig(_) => "CONFIG_ERROR",
                _ => "PROVIDER_ERROR",
            },
            ServerError::Storage(_) => "STORAGE_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = %status, code = error_code, error = %message, "request failed");
        }

        let body = Json(json!({
            "detail": message,
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

impl From<PipelineError> for ServerError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Unauthorized(reason) => ServerError::Unauthorized(reason),
            PipelineError::Malformed(reason) => ServerError::BadRequest(reason),
            PipelineError::Storage(err) => ServerError::Storage(err),
            PipelineError::Provider(err) => ServerError::Provider(err),
        }
    }
}

impl From<AuthError> for ServerError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DevBypassRefused { sentinel } => ServerError::DevBypassRefused(sentinel),
            other => ServerError::Auth(other),
        }
    }
}

impl From<MultipartError> for ServerError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(err.body_text())
        } else {
            ServerError::BadRequest(format!("invalid multipart body: {}", err.body_text()))
        }
    }
}

impl From<JsonRejection> for ServerError {
    fn from(err: JsonRejection) -> Self {
        ServerError::BadRequest(err.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(err: QueryRejection) -> Self {
        ServerError::BadRequest(err.body_text())
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}
