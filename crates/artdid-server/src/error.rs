use artdid_registry::{ErrorKind, RegistryError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// Error returned by a request handler.
///
/// Serialized as `{"success": false, "error": <kind>, "message": <text>}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidInput,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        status_for(self.kind)
    }
}

/// HTTP status for each registry error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput | ErrorKind::InvalidFormat | ErrorKind::DuplicateOwner => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::RecordNotFound => StatusCode::NOT_FOUND,
        ErrorKind::OwnerAuthorizationDenied => StatusCode::FORBIDDEN,
        ErrorKind::VersionConflict => StatusCode::CONFLICT,
        ErrorKind::LedgerUnavailable
        | ErrorKind::ContentStoreUnavailable
        | ErrorKind::ContentFetchExhausted => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'static str,
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = %self.kind, message = %self.message, "request failed");
        } else {
            tracing::debug!(kind = %self.kind, message = %self.message, "request rejected");
        }
        let body = ErrorBody {
            success: false,
            error: self.kind.as_str(),
            message: &self.message,
        };
        (status, Json(body)).into_response()
    }
}
