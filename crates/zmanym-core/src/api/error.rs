use thiserror::Error;

use crate::utils::truncate;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error ({status}): {body}")]
    ServerError { status: u16, body: String },

    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let body = truncate(body, MAX_ERROR_BODY_LENGTH);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(body),
            404 => ApiError::NotFound(body),
            429 => ApiError::RateLimited,
            code @ 500..=599 => ApiError::ServerError { status: code, body },
            code => ApiError::UnexpectedStatus { status: code, body },
        }
    }

    /// The upstream HTTP status, if this error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::AccessDenied(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::RateLimited => Some(429),
            ApiError::ServerError { status, .. } | ApiError::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::InvalidResponse(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, ""),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "no such city"),
            ApiError::NotFound(ref b) if b == "no such city"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ApiError::RateLimited
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream down"),
            ApiError::ServerError { status: 502, .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "{\"error\":\"bad geonameid\"}"),
            ApiError::UnexpectedStatus { status: 400, .. }
        ));
    }

    #[test]
    fn test_status_round_trips() {
        for code in [401u16, 403, 404, 429, 500, 503, 400, 418] {
            let status = StatusCode::from_u16(code).unwrap();
            assert_eq!(ApiError::from_status(status, "").status(), Some(code));
        }
        assert_eq!(ApiError::InvalidResponse("x".to_string()).status(), None);
    }

    #[test]
    fn test_long_body_truncated() {
        let body = "x".repeat(2000);
        match ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body) {
            ApiError::ServerError { body, .. } => assert_eq!(body.chars().count(), 500),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
