use thiserror::Error;

use crate::remote::ApiError;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to load collection{}: {body}", status_suffix(.status))]
    RemoteFetch { status: Option<u16>, body: String },

    #[error("{message}")]
    Mutation { status: Option<u16>, message: String },

    #[error("session expired, run `evcat login` to sign in again")]
    SessionExpired,

    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error("unknown resource '{0}', expected one of: firearms, narcotics, users, history")]
    InvalidResource(String),

    #[error("invalid filter '{0}': expected category=value")]
    InvalidFilter(String),

    #[error("invalid sort order '{0}', expected asc, desc or none")]
    InvalidSort(String),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    ConfirmationRequired(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl CatalogError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CatalogError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, CatalogError::SessionExpired)
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_fetch_display_includes_status() {
        let err = CatalogError::RemoteFetch {
            status: Some(503),
            body: "upstream down".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to load collection (HTTP 503): upstream down"
        );
    }

    #[test]
    fn test_remote_fetch_display_without_status() {
        let err = CatalogError::RemoteFetch {
            status: None,
            body: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "failed to load collection: connection refused");
    }

    #[test]
    fn test_validation_helper() {
        let err = CatalogError::validation("items_per_page", "must be 10, 20, 50 or 100");
        assert_eq!(
            err.to_string(),
            "invalid items_per_page: must be 10, 20, 50 or 100"
        );
        assert!(!err.is_session_expired());
        assert!(CatalogError::SessionExpired.is_session_expired());
    }
}
