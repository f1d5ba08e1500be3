use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Main error type for the relay.
///
/// Per-recipient send failures are not represented here; they are absorbed by
/// the dispatcher as [`crate::services::messaging_service::SendError`].
#[derive(Debug, Error)]
pub enum RelayError {
    // Request validation
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    // Document store
    #[error("Firestore query error: {0}")]
    FirestoreQuery(String),
    #[error("Unexpected Firestore response: {0}")]
    FirestoreResponse(String),

    // External services
    #[error("Firebase authentication error: {0}")]
    FirebaseAuth(String),

    // Network and HTTP client
    #[error("Network request timed out")]
    NetworkTimeout,
    #[error("Network connection error: {0}")]
    NetworkConnection(String),
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    // Configuration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    /// A failure surfaced to the client with a handler-specific headline.
    #[error("{context}: {details}")]
    RequestFailed { context: String, details: String },
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            RelayError::BadRequest(msg) | RelayError::InvalidBody(msg) => {
                (StatusCode::BAD_REQUEST, msg, None)
            }
            RelayError::RequestFailed { context, details } => {
                (StatusCode::INTERNAL_SERVER_ERROR, context, Some(details))
            }

            // Everything else is an infrastructure failure
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(other.to_string()),
            ),
        };

        (status, axum::Json(ErrorResponse { error, details })).into_response()
    }
}

pub type RelayResult<T> = Result<T, RelayError>;

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RelayError::NetworkTimeout
        } else if err.is_connect() {
            RelayError::NetworkConnection(err.to_string())
        } else {
            RelayError::HttpClient(err.to_string())
        }
    }
}

impl From<jsonwebtoken::errors::Error> for RelayError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        RelayError::FirebaseAuth(format!("Failed to sign service account assertion: {}", err))
    }
}

impl RelayError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        RelayError::BadRequest(msg.into())
    }

    /// Wraps any error under the headline a handler reports to its caller.
    pub fn request_failed(context: impl Into<String>, err: RelayError) -> Self {
        match err {
            // Validation errors keep their 400
            RelayError::BadRequest(_) | RelayError::InvalidBody(_) => err,
            other => RelayError::RequestFailed {
                context: context.into(),
                details: other.to_string(),
            },
        }
    }
}
