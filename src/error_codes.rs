//! Structured error codes returned by the vprikol API.
//!
//! The API reports failures as `{"error_code": <int>, "detail": "..."}`.
//! A handful of codes carry protocol meaning for the player-lookup job
//! (see [`crate::poller`]); everything else is kept verbatim in
//! [`ErrorCode::Other`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed view over the integer `error_code` field.
///
/// Serializes as the bare integer so it is wire-compatible in both directions.
///
/// ```
/// use vprikol_client::ErrorCode;
///
/// assert_eq!(ErrorCode::from(425), ErrorCode::StillQueued);
/// assert_eq!(ErrorCode::Other(400).as_i64(), 400);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ErrorCode {
    /// 422: the lookup finished and the player does not exist.
    NotFound,
    /// 425: the lookup job is still waiting in the server-side queue.
    StillQueued,
    /// 500: unhandled failure inside the API.
    InternalError,
    /// 502: the API could not reach the game server.
    BadGateway,
    /// 503: the API is temporarily unavailable.
    ServiceUnavailable,
    /// Any code without protocol meaning.
    Other(i64),
}

impl ErrorCode {
    /// The integer sent on the wire.
    pub fn as_i64(self) -> i64 {
        match self {
            Self::NotFound => 422,
            Self::StillQueued => 425,
            Self::InternalError => 500,
            Self::BadGateway => 502,
            Self::ServiceUnavailable => 503,
            Self::Other(code) => code,
        }
    }

    /// Returns `true` for the server-fault sentinels (500, 502, 503).
    pub fn is_server_fault(self) -> bool {
        matches!(
            self,
            Self::InternalError | Self::BadGateway | Self::ServiceUnavailable
        )
    }

    /// Returns a human-readable description of this error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "The player could not be found on the requested server.",
            Self::StillQueued => {
                "The lookup is still queued on the server. Poll again after a short delay."
            }
            Self::InternalError => {
                "An internal API error occurred. Please try again later."
            }
            Self::BadGateway => {
                "The API could not reach the game server. Please try again later."
            }
            Self::ServiceUnavailable => {
                "The service is temporarily unavailable. Please try again in a few moments."
            }
            Self::Other(_) => "The API rejected the request.",
        }
    }
}

impl From<i64> for ErrorCode {
    fn from(code: i64) -> Self {
        match code {
            422 => Self::NotFound,
            425 => Self::StillQueued,
            500 => Self::InternalError,
            502 => Self::BadGateway,
            503 => Self::ServiceUnavailable,
            other => Self::Other(other),
        }
    }
}

impl From<ErrorCode> for i64 {
    fn from(code: ErrorCode) -> Self {
        code.as_i64()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_i64(), self.description())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_map_both_ways() {
        for code in [422, 425, 500, 502, 503] {
            let typed = ErrorCode::from(code);
            assert!(!matches!(typed, ErrorCode::Other(_)), "{code} should be a sentinel");
            assert_eq!(typed.as_i64(), code);
        }
    }

    #[test]
    fn unknown_code_is_preserved() {
        assert_eq!(ErrorCode::from(418), ErrorCode::Other(418));
        assert_eq!(ErrorCode::Other(418).as_i64(), 418);
    }

    #[test]
    fn server_fault_classification() {
        assert!(ErrorCode::InternalError.is_server_fault());
        assert!(ErrorCode::BadGateway.is_server_fault());
        assert!(ErrorCode::ServiceUnavailable.is_server_fault());
        assert!(!ErrorCode::NotFound.is_server_fault());
        assert!(!ErrorCode::StillQueued.is_server_fault());
        assert!(!ErrorCode::Other(504).is_server_fault());
    }

    #[test]
    fn serializes_as_bare_integer() {
        assert_eq!(serde_json::to_string(&ErrorCode::StillQueued).unwrap(), "425");
        let code: ErrorCode = serde_json::from_str("503").unwrap();
        assert_eq!(code, ErrorCode::ServiceUnavailable);
    }

    #[test]
    fn display_includes_number() {
        assert!(ErrorCode::NotFound.to_string().starts_with("422"));
    }
}
