use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when interacting with the Bungie.net platform API
#[derive(Error, Debug)]
pub enum BungieApiError {
    /// Invalid request parameters (HTTP 400)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Missing or rejected API key or access token (HTTP 401, 403)
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Resource not found (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded - too many requests")]
    RateLimitExceeded,

    /// Server error (HTTP 5xx)
    #[error("Server error ({0}): {1}")]
    ServerError(StatusCode, String),

    /// Platform-level error reported inside a successful HTTP response
    #[error("Platform error {code} ({status}): {message}")]
    Platform {
        code: i32,
        status: String,
        message: String,
        throttle_seconds: u32,
    },

    /// Success envelope without a `Response` payload
    #[error("Response envelope carried no payload")]
    MissingResponse,

    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON deserialization error
    #[error("JSON error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Unknown or unexpected error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl BungieApiError {
    /// Build an error from a non-success HTTP status code and response body
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status.as_u16() {
            400 => Self::InvalidRequest(body),
            401 | 403 => Self::AuthenticationFailed(body),
            404 => Self::NotFound,
            429 => Self::RateLimitExceeded,
            500..=599 => Self::ServerError(status, body),
            _ => Self::Unknown(format!("HTTP {status}: {body}")),
        }
    }

    /// Returns true if a later attempt could plausibly succeed
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::RateLimitExceeded | Self::ServerError(_, _) | Self::NetworkError(_) => true,
            Self::Platform {
                throttle_seconds, ..
            } => *throttle_seconds > 0,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            BungieApiError::from_status(StatusCode::BAD_REQUEST, "bad".to_string()),
            BungieApiError::InvalidRequest(_)
        ));
        assert!(matches!(
            BungieApiError::from_status(StatusCode::FORBIDDEN, "key".to_string()),
            BungieApiError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            BungieApiError::from_status(StatusCode::NOT_FOUND, String::new()),
            BungieApiError::NotFound
        ));
        assert!(matches!(
            BungieApiError::from_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            BungieApiError::RateLimitExceeded
        ));
        assert!(matches!(
            BungieApiError::from_status(StatusCode::SERVICE_UNAVAILABLE, "down".to_string()),
            BungieApiError::ServerError(StatusCode::SERVICE_UNAVAILABLE, _)
        ));
        assert!(matches!(
            BungieApiError::from_status(StatusCode::IM_A_TEAPOT, String::new()),
            BungieApiError::Unknown(_)
        ));
    }

    #[test]
    fn test_transient_errors() {
        assert!(BungieApiError::RateLimitExceeded.is_transient());
        assert!(
            BungieApiError::ServerError(StatusCode::INTERNAL_SERVER_ERROR, "test".to_string())
                .is_transient()
        );
        assert!(!BungieApiError::NotFound.is_transient());
        assert!(!BungieApiError::MissingResponse.is_transient());
    }

    #[test]
    fn test_platform_error_throttle() {
        let throttled = BungieApiError::Platform {
            code: 36,
            status: "ThrottleLimitExceededMomentarily".to_string(),
            message: "slow down".to_string(),
            throttle_seconds: 10,
        };
        assert!(throttled.is_transient());

        let maintenance = BungieApiError::Platform {
            code: 5,
            status: "SystemDisabled".to_string(),
            message: "maintenance".to_string(),
            throttle_seconds: 0,
        };
        assert!(!maintenance.is_transient());
        assert_eq!(
            maintenance.to_string(),
            "Platform error 5 (SystemDisabled): maintenance"
        );
    }
}
