//! Error types for the vprikol client.

use thiserror::Error;

use crate::envelope::ValidationDetail;
use crate::error_codes::ErrorCode;

/// Errors that can occur when using the vprikol client.
#[derive(Debug, Error)]
pub enum VprikolError {
    /// The request never produced an HTTP response (DNS, connect, TLS, reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// The transport gave up waiting for a response.
    #[error("operation timed out")]
    Timeout,

    /// The server answered, but the body did not match the expected schema.
    #[error("unexpected {target} payload: {source}")]
    StructuralMismatch {
        /// Name of the type the body was decoded into.
        target: &'static str,
        /// Underlying decode failure.
        #[source]
        source: serde_json::Error,
    },

    /// The API rejected the request with a structured error body.
    #[error("API error {error_code}: {detail}")]
    Api {
        /// Structured error code.
        error_code: ErrorCode,
        /// Human-readable detail from the server.
        detail: String,
        /// Queue position, if the server reported one.
        queue_position: Option<i64>,
    },

    /// The request parameters failed the API framework's validation.
    #[error("request validation failed (HTTP {status}): {detail}")]
    Validation {
        /// HTTP status of the response.
        status: u16,
        /// Validation detail as reported by the server.
        detail: ValidationDetail,
    },

    /// The server returned an error status with a body in no known shape.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status of the response.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The lookup job failed on the server side (500/502/503); retry later.
    #[error("server fault {error_code}: {detail}")]
    FatalInfrastructure {
        /// Sentinel code reported by the server.
        error_code: ErrorCode,
        /// Human-readable detail from the server.
        detail: String,
    },

    /// The lookup job was still queued after the configured number of polls.
    #[error("lookup {request_id} still queued after {attempts} polls")]
    PollLimitExceeded {
        /// Ticket of the abandoned job.
        request_id: String,
        /// Number of polls issued.
        attempts: u32,
    },

    /// The bearer token was empty.
    #[error("API token must not be empty")]
    InvalidToken,

    /// A typed argument was outside the range the API accepts.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl VprikolError {
    /// Structured error code carried by this error, if any.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api { error_code, .. } | Self::FatalInfrastructure { error_code, .. } => {
                Some(*error_code)
            }
            _ => None,
        }
    }
}

/// A specialized [`Result`] type for vprikol client operations.
pub type Result<T> = std::result::Result<T, VprikolError>;
