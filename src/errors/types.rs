//! Error type definitions for the dashboard
//!
//! Only failures that must interrupt an operation live here. Unknown job
//! names, duplicate names and bad config values are handled where they occur
//! with a logged warning and a safe fallback.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Page rendering errors
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Errors raised by the covid and news fetch collaborators
#[derive(Error, Debug)]
pub enum SourceError {
    /// The provider credential has not been configured
    #[error("Missing credential: {service} - {message}")]
    MissingCredential { service: String, message: String },

    /// The provider rejected the configured credential
    #[error("Unauthorized: {service} - {message}")]
    Unauthorized { service: String, message: String },

    /// Non-success HTTP status from the provider
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Payload could not be interpreted
    #[error("Parse error: {source_type} - {message}")]
    ParseError { source_type: String, message: String },

    /// Transport failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Local dataset file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    /// Create a missing credential error
    pub fn missing_credential<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::MissingCredential {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::Unauthorized {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse_error<S: Into<String>, M: Into<String>>(source_type: S, message: M) -> Self {
        Self::ParseError {
            source_type: source_type.into(),
            message: message.into(),
        }
    }

    /// True when the failure is caused by an unset or rejected credential
    pub fn is_credential_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential { .. } | Self::Unauthorized { .. }
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!("Request failed: {}", self);
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
            "timestamp": chrono::Utc::now(),
        }));
        (status, body).into_response()
    }
}
