// Token refresh logic

use anyhow::{Context, Result};
use reqwest::Client;

use super::types::{RefreshRequest, RefreshResponse, TokenData};

/// Get refresh URL for a backend base URL
pub fn get_refresh_url(base_url: &str) -> String {
    format!("{}/token/refresh/", base_url.trim_end_matches('/'))
}

/// Exchange a refresh credential for a new access credential
///
/// Any non-2xx status, transport failure, unparseable body or missing
/// `access` field is an error.
pub async fn refresh_access_token(
    client: &Client,
    refresh_url: &str,
    refresh_token: &str,
) -> Result<TokenData> {
    tracing::info!("Refreshing access token...");

    let response = client
        .post(refresh_url)
        .json(&RefreshRequest {
            refresh: refresh_token,
        })
        .send()
        .await
        .context("Failed to send token refresh request")?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        tracing::error!(
            status = status.as_u16(),
            body = %error_text,
            "Token refresh rejected"
        );
        anyhow::bail!("Token refresh failed: {} - {}", status, error_text);
    }

    let data: RefreshResponse = response
        .json()
        .await
        .context("Failed to parse token refresh response")?;

    let access_token = match data.access {
        Some(token) if !token.is_empty() => token,
        _ => anyhow::bail!("Token refresh response does not contain access"),
    };

    tracing::info!(
        rotated = data.refresh.is_some(),
        "Access token refreshed"
    );

    Ok(TokenData {
        access_token,
        refresh_token: data.refresh.filter(|t| !t.is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn test_get_refresh_url() {
        assert_eq!(
            get_refresh_url("http://localhost:8001/api"),
            "http://localhost:8001/api/token/refresh/"
        );
        assert_eq!(
            get_refresh_url("http://localhost:8001/api/"),
            "http://localhost:8001/api/token/refresh/"
        );
    }

    #[tokio::test]
    async fn test_refresh_success_with_rotation() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/token/refresh/")
            .match_body(Matcher::Json(json!({"refresh": "R1"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access": "A2", "refresh": "R2"}"#)
            .create_async()
            .await;

        let url = get_refresh_url(&format!("{}/api", server.url()));
        let data = refresh_access_token(&Client::new(), &url, "R1")
            .await
            .unwrap();

        assert_eq!(data.access_token, "A2");
        assert_eq!(data.refresh_token.as_deref(), Some("R2"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_refresh_missing_access_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/token/refresh/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"refresh": "R2"}"#)
            .create_async()
            .await;

        let url = get_refresh_url(&format!("{}/api", server.url()));
        let err = refresh_access_token(&Client::new(), &url, "R1")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not contain access"));
    }

    #[tokio::test]
    async fn test_refresh_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/token/refresh/")
            .with_status(401)
            .with_body(r#"{"detail": "Token is invalid or expired"}"#)
            .create_async()
            .await;

        let url = get_refresh_url(&format!("{}/api", server.url()));
        let err = refresh_access_token(&Client::new(), &url, "R1")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("401"));
    }
}
