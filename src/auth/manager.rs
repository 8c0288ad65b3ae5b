use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::refresh;
use super::session::SessionExpiredHandler;
use super::store::CredentialStore;
use super::types::{
    token_preview, CredentialPair, ObtainPairRequest, ObtainPairResponse, RefreshRequest,
};
use crate::error::ClientError;

/// Authentication manager
/// Owns the credential store and serializes refreshes across concurrent callers
pub struct AuthManager {
    /// Injected credential slot
    store: Arc<dyn CredentialStore>,

    /// HTTP client for refresh, login and logout calls
    client: Client,

    /// Backend base URL (origin + path prefix)
    base_url: String,

    /// Called after credentials are wiped on irrecoverable failure
    on_expired: Arc<dyn SessionExpiredHandler>,

    /// Held while a refresh is in flight
    refresh_lock: Mutex<()>,
}

impl AuthManager {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        client: Client,
        base_url: impl Into<String>,
        on_expired: Arc<dyn SessionExpiredHandler>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            store,
            client,
            base_url,
            on_expired,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Current access credential, if one is stored
    pub fn access_token(&self) -> Result<Option<String>, ClientError> {
        let stored = self.store.get().map_err(ClientError::Storage)?;
        Ok(stored.access_token)
    }

    /// Recover from a 401 that was returned for `rejected`
    ///
    /// Returns the access token to replay with. If another caller refreshed
    /// while this one waited for the lock, its token is reused and no second
    /// refresh call is made. Every failure expires the session.
    pub async fn refresh_after_unauthorized(
        &self,
        rejected: Option<&str>,
    ) -> Result<String, ClientError> {
        let _guard = self.refresh_lock.lock().await;

        let stored = match self.store.get() {
            Ok(stored) => stored,
            Err(e) => return Err(self.expire_session(&format!("{:#}", e))),
        };

        let Some(refresh_token) = stored.refresh_token else {
            return Err(self.expire_session("no refresh credential stored"));
        };

        if let Some(current) = stored.access_token {
            if rejected != Some(current.as_str()) {
                tracing::debug!(
                    token = %token_preview(&current),
                    "Access token already refreshed by another request"
                );
                return Ok(current);
            }
        }

        let refresh_url = refresh::get_refresh_url(&self.base_url);
        let token_data =
            match refresh::refresh_access_token(&self.client, &refresh_url, &refresh_token).await {
                Ok(data) => data,
                Err(e) => return Err(self.expire_session(&format!("{:#}", e))),
            };

        // Both tokens go to the store in one write before the replay
        let pair = CredentialPair {
            access_token: token_data.access_token,
            refresh_token: token_data.refresh_token.unwrap_or(refresh_token),
        };
        if let Err(e) = self.store.set(&pair) {
            return Err(self.expire_session(&format!("failed to persist tokens: {:#}", e)));
        }

        Ok(pair.access_token)
    }

    /// Wipe credentials, notify the handler and produce `SessionExpired`
    pub fn expire_session(&self, reason: &str) -> ClientError {
        tracing::error!(reason = %reason, "Session cannot be recovered");

        if let Err(e) = self.store.clear() {
            tracing::error!("Failed to clear credentials: {:#}", e);
        }
        self.on_expired.on_session_expired();

        ClientError::SessionExpired
    }

    /// Obtain a fresh credential pair with username and password
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let url = format!("{}/token/", self.base_url);
        tracing::info!(username = %username, "Logging in");

        let response = self
            .client
            .post(&url)
            .json(&ObtainPairRequest { username, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "Login rejected");
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let data: ObtainPairResponse = response.json().await?;
        self.store
            .set(&CredentialPair::new(data.access, data.refresh))
            .map_err(ClientError::Storage)?;

        tracing::info!("Login successful");
        Ok(())
    }

    /// Revoke the refresh credential server-side, then forget both tokens
    ///
    /// The revoke call is best effort; local credentials are always cleared.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let stored = match self.store.get() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!("Failed to read credentials before logout: {:#}", e);
                Default::default()
            }
        };

        if let Some(refresh_token) = stored.refresh_token.as_deref() {
            let url = format!("{}/auth/logout/", self.base_url);
            let mut request = self.client.post(&url).json(&RefreshRequest {
                refresh: refresh_token,
            });
            if let Some(access_token) = stored.access_token.as_deref() {
                request = request.header(AUTHORIZATION, format!("Bearer {}", access_token));
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!("Refresh credential revoked");
                }
                Ok(response) => {
                    tracing::warn!(status = %response.status(), "Logout call rejected");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Logout call failed");
                }
            }
        }

        self.store.clear().map_err(ClientError::Storage)?;
        tracing::info!("Logged out");
        Ok(())
    }
}
