//! Uniform success/error wrapper around every API response.
//!
//! [`Envelope::decode`] turns an [`HttpResponse`] into either decoded data
//! (2xx) or an [`ErrorBody`] (any other status). The error body is tried as
//! the API's own structured error first, then as a framework validation
//! error, and finally kept as raw text.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, VprikolError};
use crate::error_codes::ErrorCode;
use crate::transport::HttpResponse;

/// Structured error reported by the API itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error_code: ErrorCode,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_position: Option<i64>,
}

/// One segment of a validation error location, e.g. `["query", "server"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(u64),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(rename = "loc")]
    pub field_path: Vec<PathSegment>,
    #[serde(rename = "msg")]
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<String> = self.field_path.iter().map(ToString::to_string).collect();
        write!(f, "{}: {} ({})", path.join("."), self.message, self.kind)
    }
}

/// The `detail` of a framework validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationDetail {
    Message(String),
    Field(FieldError),
    Fields(Vec<FieldError>),
}

impl fmt::Display for ValidationDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(message) => f.write_str(message),
            Self::Field(field) => field.fmt(f),
            Self::Fields(fields) => {
                let parts: Vec<String> = fields.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join("; "))
            }
        }
    }
}

/// Error emitted by the web framework before the request reached the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorBody {
    pub detail: ValidationDetail,
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    Api(ApiErrorBody),
    Validation(ValidationErrorBody),
    /// Neither known shape matched; the body as text.
    Raw(String),
}

impl ErrorBody {
    /// Classify an error response body.
    pub fn parse(body: &[u8]) -> Self {
        if let Ok(api) = serde_json::from_slice::<ApiErrorBody>(body) {
            return Self::Api(api);
        }
        if let Ok(validation) = serde_json::from_slice::<ValidationErrorBody>(body) {
            return Self::Validation(validation);
        }
        Self::Raw(String::from_utf8_lossy(body).into_owned())
    }

    /// Structured error code, if this is an API error.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api(api) => Some(api.error_code),
            _ => None,
        }
    }

    /// Convert into the matching [`VprikolError`].
    pub fn into_error(self, status: u16) -> VprikolError {
        match self {
            Self::Api(api) => VprikolError::Api {
                error_code: api.error_code,
                detail: api.detail,
                queue_position: api.queue_position,
            },
            Self::Validation(validation) => VprikolError::Validation {
                status,
                detail: validation.detail,
            },
            Self::Raw(body) => VprikolError::Http { status, body },
        }
    }
}

/// Decoded response: either data or an error, never both.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    status: u16,
    data: Option<T>,
    error: Option<ErrorBody>,
}

impl<T> Envelope<T> {
    pub fn ok(status: u16, data: T) -> Self {
        Self {
            status,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(status: u16, error: ErrorBody) -> Self {
        Self {
            status,
            data: None,
            error: Some(error),
        }
    }

    /// HTTP status the envelope was decoded from.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn success(&self) -> bool {
        self.data.is_some() && self.error.is_none()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&ErrorBody> {
        self.error.as_ref()
    }

    /// Transform the payload, leaving an error untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            status: self.status,
            data: self.data.map(f),
            error: self.error,
        }
    }

    /// Split into the payload or the error body.
    pub fn into_inner(self) -> std::result::Result<T, (u16, ErrorBody)> {
        match (self.data, self.error) {
            (Some(data), None) => Ok(data),
            (_, Some(error)) => Err((self.status, error)),
            (None, None) => Err((self.status, ErrorBody::Raw(String::new()))),
        }
    }

    /// The payload, or the error body converted into a [`VprikolError`].
    pub fn into_result(self) -> Result<T> {
        self.into_inner()
            .map_err(|(status, error)| error.into_error(status))
    }
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decode a transport response into an envelope.
    ///
    /// # Errors
    ///
    /// Returns [`VprikolError::StructuralMismatch`] when a 2xx body does not
    /// decode into `T`. Error bodies never fail: unknown shapes become
    /// [`ErrorBody::Raw`].
    pub fn decode(response: &HttpResponse) -> Result<Self> {
        if !response.is_success() {
            let error = ErrorBody::parse(&response.body);
            debug!(status = response.status, error = ?error, "API returned an error body");
            return Ok(Self::err(response.status, error));
        }
        let data = decode_payload(&response.body)?;
        Ok(Self::ok(response.status, data))
    }
}

/// Decode a JSON payload, tagging failures with the target type.
pub(crate) fn decode_payload<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| VprikolError::StructuralMismatch {
        target: std::any::type_name::<T>(),
        source,
    })
}

/// Decode an already-parsed JSON value, tagging failures with the target type.
pub(crate) fn decode_value<T: DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value).map_err(|source| VprikolError::StructuralMismatch {
        target: std::any::type_name::<T>(),
        source,
    })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Probe {
        value: u32,
    }

    #[test]
    fn success_body_decodes_into_data() {
        let resp = HttpResponse::new(200, r#"{"value": 7}"#);
        let env = Envelope::<Probe>::decode(&resp).unwrap();
        assert!(env.success());
        assert_eq!(env.data(), Some(&Probe { value: 7 }));
        assert!(env.error().is_none());
    }

    #[test]
    fn success_body_with_wrong_shape_is_structural_mismatch() {
        let resp = HttpResponse::new(200, r#"{"other": true}"#);
        let err = Envelope::<Probe>::decode(&resp).unwrap_err();
        assert!(matches!(err, VprikolError::StructuralMismatch { .. }));
    }

    #[test]
    fn api_error_is_tried_first() {
        let resp = HttpResponse::new(
            400,
            r#"{"error_code": 425, "detail": "queued", "queue_position": 3}"#,
        );
        let env = Envelope::<Probe>::decode(&resp).unwrap();
        assert!(!env.success());
        assert!(env.data().is_none());
        match env.error().unwrap() {
            ErrorBody::Api(api) => {
                assert_eq!(api.error_code, ErrorCode::StillQueued);
                assert_eq!(api.detail, "queued");
                assert_eq!(api.queue_position, Some(3));
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn string_detail_is_validation_error() {
        let body = ErrorBody::parse(br#"{"detail": "Not authenticated"}"#);
        assert_eq!(
            body,
            ErrorBody::Validation(ValidationErrorBody {
                detail: ValidationDetail::Message("Not authenticated".into()),
            })
        );
    }

    #[test]
    fn field_list_detail_is_validation_error() {
        let body = ErrorBody::parse(
            br#"{"detail": [{"loc": ["query", "server", 0], "msg": "field required", "type": "value_error.missing"}]}"#,
        );
        let ErrorBody::Validation(validation) = body else {
            panic!("expected validation body");
        };
        let ValidationDetail::Fields(fields) = &validation.detail else {
            panic!("expected field list");
        };
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].message, "field required");
        assert_eq!(fields[0].field_path[2], PathSegment::Index(0));
        assert_eq!(
            validation.detail.to_string(),
            "query.server.0: field required (value_error.missing)"
        );
    }

    #[test]
    fn unknown_body_falls_back_to_raw_text() {
        let resp = HttpResponse::new(502, "<html>Bad Gateway</html>");
        let env = Envelope::<Probe>::decode(&resp).unwrap();
        assert_eq!(
            env.error(),
            Some(&ErrorBody::Raw("<html>Bad Gateway</html>".into()))
        );
        let err = env.into_result().unwrap_err();
        assert!(matches!(err, VprikolError::Http { status: 502, .. }));
    }

    #[test]
    fn into_result_maps_api_error() {
        let env: Envelope<Probe> = Envelope::err(
            400,
            ErrorBody::Api(ApiErrorBody {
                error_code: ErrorCode::Other(400),
                detail: "bad nick".into(),
                queue_position: None,
            }),
        );
        let err = env.into_result().unwrap_err();
        assert!(matches!(
            err,
            VprikolError::Api { error_code: ErrorCode::Other(400), ref detail, .. } if detail == "bad nick"
        ));
    }

    #[test]
    fn map_keeps_status_and_error() {
        let env = Envelope::ok(200, 2u32).map(|v| v * 10);
        assert_eq!(env.status(), 200);
        assert_eq!(env.into_result().unwrap(), 20);
    }
}
