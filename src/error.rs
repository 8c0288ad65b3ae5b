// Error handling module
// Defines the error taxonomy surfaced by the request pipeline

use thiserror::Error;

/// Errors that can occur while talking to the backend
#[derive(Error, Debug)]
pub enum ClientError {
    /// Terminal non-2xx response, after at most one replay
    #[error("API error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Refresh credential missing or refresh failed; credentials were cleared
    #[error("Session expired")]
    SessionExpired,

    /// Network-level failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// 2xx body declared as JSON did not parse
    #[error("Invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Credential store failure outside the refresh path
    #[error("Credential storage error: {0}")]
    Storage(anyhow::Error),
}

impl ClientError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::SessionExpired)
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ClientError::Http {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 500 - boom");

        assert_eq!(ClientError::SessionExpired.to_string(), "Session expired");

        let err = ClientError::InvalidRequest("bad url".to_string());
        assert_eq!(err.to_string(), "Invalid request: bad url");

        let err = ClientError::Storage(anyhow::anyhow!("disk full"));
        assert_eq!(err.to_string(), "Credential storage error: disk full");
    }

    #[test]
    fn test_status_accessor() {
        let err = ClientError::Http {
            status: 404,
            message: String::new(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(ClientError::SessionExpired.status(), None);
    }

    #[test]
    fn test_is_session_expired() {
        assert!(ClientError::SessionExpired.is_session_expired());
        assert!(!ClientError::Http {
            status: 401,
            message: String::new()
        }
        .is_session_expired());
    }

    #[test]
    fn test_decode_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ClientError = json_err.into();
        assert!(matches!(err, ClientError::Decode(_)));
        assert_eq!(err.status(), None);
    }
}
