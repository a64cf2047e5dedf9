// src/error.rs
//! Domain errors for the matching workflows

use serde::Serialize;

/// Local precondition failures. These never reach the network.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationError {
    #[error("Please upload a PDF resume.")]
    MissingResume,

    #[error("Please paste a job description.")]
    MissingJobText,
}

/// Raised by a [`MatchTransport`](crate::core::MatchTransport) when no HTTP
/// response could be obtained at all.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError(format!("request timed out: {}", err))
        } else if err.is_connect() {
            TransportError(format!("could not connect to matching service: {}", err))
        } else {
            TransportError(err.to_string())
        }
    }
}

/// Why a request to the matching service did not produce a result.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchFailure {
    /// Non-2xx response carrying a usable `error` field.
    #[error("{message}")]
    Service { status: u16, message: String },

    /// Network failure, timeout, or non-2xx response without a usable body.
    #[error("{}", detail.as_deref().unwrap_or(GENERIC_FAILURE))]
    Transport {
        status: Option<u16>,
        detail: Option<String>,
    },
}

pub(crate) const GENERIC_FAILURE: &str = "Unknown error";

impl MatchFailure {
    /// Best available human-readable reason: server message, then transport
    /// detail, then a generic default.
    pub fn message(&self) -> &str {
        match self {
            MatchFailure::Service { message, .. } => message,
            MatchFailure::Transport { detail, .. } => detail.as_deref().unwrap_or(GENERIC_FAILURE),
        }
    }

    pub fn is_service_error(&self) -> bool {
        matches!(self, MatchFailure::Service { .. })
    }
}
