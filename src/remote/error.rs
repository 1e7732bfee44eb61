//! Transport-level API errors.
//!
//! The client reports every non-2xx response and every network failure as an
//! [`ApiError`]. Callers then classify it: a failed collection load becomes
//! [`CatalogError::RemoteFetch`], a failed create/update/delete becomes
//! [`CatalogError::Mutation`].

use std::fmt;

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::CatalogError;

/// Message shown when a mutation fails and the server gave no usable detail.
pub const GENERIC_MUTATION_FAILURE: &str = "the request could not be completed, please try again";

/// Error returned by the catalog backend or the network layer.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code, if a response was received
    pub status: Option<StatusCode>,
    /// Raw response body, or the network error message
    pub body: String,
}

impl ApiError {
    pub fn from_status(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            body: body.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            body: message.into(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status.map(|s| s.as_u16())
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(StatusCode::NOT_FOUND)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(StatusCode::UNAUTHORIZED)
    }

    /// Extract the server-provided detail message.
    ///
    /// The backend reports errors as `{"detail": "..."}`, or for request
    /// validation failures as `{"detail": [{"msg": "..."}, ...]}`.
    pub fn detail(&self) -> Option<String> {
        let value: Value = serde_json::from_str(&self.body).ok()?;
        match value.get("detail")? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            _ => None,
        }
    }

    /// Best message to show a user: the detail field, then the raw body,
    /// then the generic fallback.
    pub fn user_message(&self) -> String {
        if let Some(detail) = self.detail() {
            return detail;
        }
        let body = self.body.trim();
        if body.is_empty() {
            GENERIC_MUTATION_FAILURE.to_string()
        } else {
            body.to_string()
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}: {}", status.as_u16(), self.body),
            None => write!(f, "{}", self.body),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            status: err.status(),
            body: err.to_string(),
        }
    }
}

impl CatalogError {
    /// Classify a transport failure that happened while loading a collection.
    pub fn into_fetch_error(self) -> CatalogError {
        match self {
            CatalogError::Api(err) => CatalogError::RemoteFetch {
                status: err.status_code(),
                body: err.body,
            },
            CatalogError::Http(err) => CatalogError::RemoteFetch {
                status: err.status().map(|s| s.as_u16()),
                body: err.to_string(),
            },
            CatalogError::Json(err) => CatalogError::RemoteFetch {
                status: None,
                body: format!("malformed response: {err}"),
            },
            other => other,
        }
    }

    /// Classify a transport failure that happened during a create, update or
    /// delete request.
    pub fn into_mutation_error(self) -> CatalogError {
        match self {
            CatalogError::Api(err) => CatalogError::Mutation {
                status: err.status_code(),
                message: err.user_message(),
            },
            CatalogError::Http(err) => CatalogError::Mutation {
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_string() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "Narcotic is referenced by history records"}"#,
        );
        assert_eq!(
            err.detail().as_deref(),
            Some("Narcotic is referenced by history records")
        );
        assert_eq!(err.user_message(), "Narcotic is referenced by history records");
    }

    #[test]
    fn test_detail_validation_array() {
        let err = ApiError::from_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [{"msg": "field required"}, {"msg": "value is not a valid email"}]}"#,
        );
        assert_eq!(
            err.detail().as_deref(),
            Some("field required; value is not a valid email")
        );
    }

    #[test]
    fn test_user_message_falls_back_to_body_then_generic() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        assert_eq!(err.user_message(), "Internal Server Error");

        let empty = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "  ");
        assert_eq!(empty.user_message(), GENERIC_MUTATION_FAILURE);
    }

    #[test]
    fn test_display() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "missing");
        assert_eq!(err.to_string(), "HTTP 404: missing");
        assert!(err.is_not_found());

        let net = ApiError::network("connection refused");
        assert_eq!(net.to_string(), "connection refused");
        assert_eq!(net.status_code(), None);
    }

    #[test]
    fn test_into_fetch_error() {
        let err = CatalogError::Api(ApiError::from_status(
            StatusCode::SERVICE_UNAVAILABLE,
            "maintenance",
        ))
        .into_fetch_error();
        match err {
            CatalogError::RemoteFetch { status, body } => {
                assert_eq!(status, Some(503));
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_into_mutation_error_keeps_session_expired() {
        let err = CatalogError::SessionExpired.into_mutation_error();
        assert!(err.is_session_expired());

        let err = CatalogError::Api(ApiError::from_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"detail": "database unavailable"}"#,
        ))
        .into_mutation_error();
        match err {
            CatalogError::Mutation { status, message } => {
                assert_eq!(status, Some(500));
                assert_eq!(message, "database unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
