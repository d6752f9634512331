//! Error types for TMDB API operations.

use thiserror::Error;

/// HTTP status TMDB answers with when a client exceeds its request budget.
pub const THROTTLE_STATUS: u16 = 429;

/// Errors that can occur when talking to TMDB.
#[derive(Debug, Error)]
pub enum TmdbError {
    /// Transport-level failure (connect, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned a non-2xx response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Pagination ran past the configured page guard.
    #[error("Pagination exceeded {max_pages} pages")]
    PageLimitExceeded { max_pages: u32 },
}

impl TmdbError {
    /// Whether this error is a throttle signal worth retrying.
    pub fn is_throttled(&self) -> bool {
        matches!(
            self,
            Self::Api {
                status: THROTTLE_STATUS,
                ..
            }
        )
    }
}

/// Short error message suitable for progress output.
pub fn short_error_message(err: &TmdbError) -> String {
    match err {
        TmdbError::Http(_) => "Network error".to_string(),
        TmdbError::Json(_) => "JSON parse error".to_string(),
        TmdbError::Api { status, message } => {
            if message.chars().count() > 50 {
                let truncated: String = message.chars().take(47).collect();
                format!("HTTP {}: {}...", status, truncated)
            } else {
                format!("HTTP {}: {}", status, message)
            }
        }
        TmdbError::Config(msg) => format!("Config: {}", msg),
        TmdbError::PageLimitExceeded { max_pages } => {
            format!("More than {} pages", max_pages)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_throttled() {
        let api_429 = TmdbError::Api {
            status: 429,
            message: "too many requests".to_string(),
        };
        assert!(api_429.is_throttled());

        let api_500 = TmdbError::Api {
            status: 500,
            message: "server error".to_string(),
        };
        assert!(!api_500.is_throttled());
        assert!(!TmdbError::Http("connection reset".to_string()).is_throttled());
    }

    #[test]
    fn test_short_error_message_truncates_long_bodies() {
        let err = TmdbError::Api {
            status: 401,
            message: "x".repeat(80),
        };
        let msg = short_error_message(&err);
        assert!(msg.starts_with("HTTP 401: "));
        assert!(msg.ends_with("..."));

        let err = TmdbError::PageLimitExceeded { max_pages: 500 };
        assert_eq!(short_error_message(&err), "More than 500 pages");
    }
}
