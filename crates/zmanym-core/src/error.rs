//! Error taxonomy surfaced by the client facade.
//!
//! Field-level problems never show up here: the normalizer degrades them to
//! the unavailable sentinel. Only total failures (no response, empty lookup,
//! unusable payload) become a `ZmanymError`.

use thiserror::Error;

use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum ZmanymError {
    #[error("Location search failed: {0}")]
    Search(#[source] ApiError),

    #[error("Failed to fetch calendar data: {0}")]
    Fetch(#[source] ApiError),

    #[error("Location lookup failed: {0}")]
    Lookup(#[source] ApiError),

    #[error("No location found for {0}")]
    NoLocationFound(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Location permission denied: {0}")]
    Permission(String),

    #[error("{0}")]
    Unknown(String),
}

/// Coarse classification used by front-ends to pick a message and decide
/// whether to offer a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Location,
    MalformedResponse,
    Permission,
    Unknown,
}

impl ZmanymError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ZmanymError::Search(_) | ZmanymError::Fetch(_) | ZmanymError::Lookup(_) => {
                ErrorKind::Network
            }
            ZmanymError::NoLocationFound(_) => ErrorKind::Location,
            ZmanymError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            ZmanymError::Permission(_) => ErrorKind::Permission,
            ZmanymError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Permission denials need user action; everything else may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        self.kind() != ErrorKind::Permission
    }

    /// Upstream HTTP status, when the failure came from a non-2xx response.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ZmanymError::Search(e) | ZmanymError::Fetch(e) | ZmanymError::Lookup(e) => e.status(),
            _ => None,
        }
    }

    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Network => "Unable to connect to the server. Please check your internet \
                                   connection and try again."
                .to_string(),
            ErrorKind::Location => "Unable to determine your location. Please search for a \
                                    location manually."
                .to_string(),
            ErrorKind::MalformedResponse => {
                "Unable to fetch Shabbat times. Please try again in a moment.".to_string()
            }
            ErrorKind::Permission => "Location access was denied. Please enable location \
                                      permissions or search for a location manually."
                .to_string(),
            ErrorKind::Unknown => match self {
                ZmanymError::Unknown(msg) if !msg.is_empty() => msg.clone(),
                _ => "An unexpected error occurred. Please try again.".to_string(),
            },
        }
    }
}
