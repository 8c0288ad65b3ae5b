// Authentication types

use serde::{Deserialize, Serialize};

/// Storage key for the access credential
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage key for the refresh credential
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Complete credential set, always written as a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl CredentialPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// Snapshot of both credential slots as read from a store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredCredentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl StoredCredentials {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

impl From<CredentialPair> for StoredCredentials {
    fn from(pair: CredentialPair) -> Self {
        Self {
            access_token: Some(pair.access_token),
            refresh_token: Some(pair.refresh_token),
        }
    }
}

/// Body of `POST token/refresh/` and `POST auth/logout/`
#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Refresh endpoint response
///
/// `access` is optional at the wire level so a 2xx body without it can be
/// reported as a protocol violation instead of a decode error.
#[derive(Deserialize)]
pub struct RefreshResponse {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

/// Body of `POST token/`
#[derive(Serialize)]
pub struct ObtainPairRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response of `POST token/`
#[derive(Deserialize)]
pub struct ObtainPairResponse {
    pub access: String,
    pub refresh: String,
}

/// Token data from a successful refresh
#[derive(Debug, Clone)]
pub struct TokenData {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Shorten a token for log output
pub fn token_preview(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    format!("{}...", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_preview_truncates() {
        assert_eq!(token_preview("abcdefghijklmnop"), "abcdefgh...");
        assert_eq!(token_preview("abc"), "abc...");
    }

    #[test]
    fn test_refresh_response_without_access() {
        let data: RefreshResponse = serde_json::from_str(r#"{"refresh": "R2"}"#).unwrap();
        assert!(data.access.is_none());
        assert_eq!(data.refresh.as_deref(), Some("R2"));
    }

    #[test]
    fn test_refresh_request_shape() {
        let body = serde_json::to_value(RefreshRequest { refresh: "R1" }).unwrap();
        assert_eq!(body, serde_json::json!({"refresh": "R1"}));
    }

    #[test]
    fn test_stored_credentials_from_pair() {
        let stored = StoredCredentials::from(CredentialPair::new("A1", "R1"));
        assert_eq!(stored.access_token.as_deref(), Some("A1"));
        assert_eq!(stored.refresh_token.as_deref(), Some("R1"));
        assert!(!stored.is_empty());
        assert!(StoredCredentials::default().is_empty());
    }
}
