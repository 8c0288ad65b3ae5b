use anyhow::{Context, Result as AnyResult};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Request, Response, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::auth::AuthManager;
use crate::error::{ClientError, Result};

/// Methods the backend API accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

impl FromStr for HttpMethod {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(ClientError::InvalidRequest(format!(
                "unsupported method: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Method::from(*self), f)
    }
}

/// Method, headers and optional body of one call
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(HttpMethod::Get)
    }
}

impl RequestOptions {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get() -> Self {
        Self::new(HttpMethod::Get)
    }

    pub fn post() -> Self {
        Self::new(HttpMethod::Post)
    }

    pub fn put() -> Self {
        Self::new(HttpMethod::Put)
    }

    pub fn delete() -> Self {
        Self::new(HttpMethod::Delete)
    }

    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ClientError::InvalidRequest(format!("invalid header name: {}", e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::InvalidRequest(format!("invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `data` as the JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, data: &T) -> Result<Self> {
        let body = serde_json::to_vec(data)
            .map_err(|e| ClientError::InvalidRequest(format!("unserializable body: {}", e)))?;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(Bytes::from(body));
        Ok(self)
    }
}

/// Parsed body of a successful response
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// 204 No Content
    Empty,
    Json(Value),
    Text(String),
}

impl ApiResponse {
    pub fn is_empty(&self) -> bool {
        matches!(self, ApiResponse::Empty)
    }

    /// Flatten into a JSON value; empty becomes `null`, text becomes a string
    pub fn into_json(self) -> Value {
        match self {
            ApiResponse::Empty => Value::Null,
            ApiResponse::Json(value) => value,
            ApiResponse::Text(text) => Value::String(text),
        }
    }
}

/// Build the pooled HTTP client shared by the pipeline and the auth manager
///
/// No request timeout is set; callers bound calls by cancelling them.
pub fn build_http_client(max_connections: usize) -> AnyResult<Client> {
    Client::builder()
        .pool_max_idle_per_host(max_connections)
        .build()
        .context("Failed to create HTTP client")
}

/// HTTP client for the tournament API with transparent token refresh
pub struct ApiClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Authentication manager
    auth_manager: Arc<AuthManager>,
}

impl ApiClient {
    pub fn new(client: Client, auth_manager: Arc<AuthManager>) -> Self {
        Self {
            client,
            auth_manager,
        }
    }

    pub fn auth(&self) -> &Arc<AuthManager> {
        &self.auth_manager
    }

    /// Resolve a fully-qualified or base-relative URL
    pub fn resolve_url(&self, url: &str) -> Result<Url> {
        let full = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.auth_manager.base_url(), url)
        } else {
            format!("{}/{}", self.auth_manager.base_url(), url)
        };

        Url::parse(&full)
            .map_err(|e| ClientError::InvalidRequest(format!("invalid url {}: {}", full, e)))
    }

    /// Perform one call with bearer auth and at most one refresh-and-replay
    ///
    /// Only a 401 enters the refresh path. Any other non-2xx status is
    /// returned as `ClientError::Http` without touching stored credentials.
    pub async fn request(&self, url: &str, options: RequestOptions) -> Result<ApiResponse> {
        let url = self.resolve_url(url)?;
        let mut request = self.build_request(url, options)?;

        let sent_token = self.auth_manager.access_token()?;
        if let Some(token) = sent_token.as_deref() {
            set_bearer(&mut request, token)?;
        }

        let replay = request.try_clone().ok_or_else(|| {
            ClientError::InvalidRequest("Request body is not cloneable".to_string())
        })?;

        let mut response = self.execute(request).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!("Received 401, refreshing access token and retrying...");
            let token = self
                .auth_manager
                .refresh_after_unauthorized(sent_token.as_deref())
                .await?;

            let mut replay = replay;
            set_bearer(&mut replay, &token)?;

            // Network failure of the replay expires the session
            response = match self.execute(replay).await {
                Ok(response) => response,
                Err(e) => {
                    return Err(self
                        .auth_manager
                        .expire_session(&format!("replayed request failed: {}", e)))
                }
            };
        }

        read_response(response).await
    }

    /// GET `endpoint` with query parameters appended
    pub async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<ApiResponse> {
        let mut url = self.resolve_url(endpoint)?;
        if !params.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        self.request(url.as_str(), RequestOptions::get()).await
    }

    /// POST `data` as JSON
    pub async fn post<T: Serialize + ?Sized>(&self, endpoint: &str, data: &T) -> Result<ApiResponse> {
        self.request(endpoint, RequestOptions::post().json(data)?)
            .await
    }

    /// POST without a body
    pub async fn post_empty(&self, endpoint: &str) -> Result<ApiResponse> {
        self.request(endpoint, RequestOptions::post()).await
    }

    /// PUT `data` as JSON
    pub async fn put<T: Serialize + ?Sized>(&self, endpoint: &str, data: &T) -> Result<ApiResponse> {
        self.request(endpoint, RequestOptions::put().json(data)?)
            .await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<ApiResponse> {
        self.request(endpoint, RequestOptions::delete()).await
    }

    /// GET without credentials; never enters the refresh path
    pub async fn get_public(&self, url: Url) -> Result<ApiResponse> {
        let request = self.build_request(url, RequestOptions::get())?;
        let response = self.execute(request).await?;
        read_response(response).await
    }

    fn build_request(&self, url: Url, options: RequestOptions) -> Result<Request> {
        let mut builder = self
            .client
            .request(options.method.into(), url)
            .headers(options.headers);
        if let Some(body) = options.body {
            builder = builder.body(body);
        }

        builder
            .build()
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))
    }

    async fn execute(&self, request: Request) -> Result<Response> {
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(
            method = %method,
            url = %url,
            "Sending HTTP request"
        );

        match self.client.execute(request).await {
            Ok(response) => {
                tracing::debug!(
                    status = %response.status(),
                    "Received HTTP response"
                );
                Ok(response)
            }
            Err(e) => {
                let error_kind = if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connection_failed"
                } else if e.is_request() {
                    "request_error"
                } else if e.is_body() {
                    "body_error"
                } else {
                    "unknown"
                };

                tracing::error!(
                    error_kind = error_kind,
                    error = %e,
                    method = %method,
                    url = %url,
                    "HTTP request error"
                );
                Err(ClientError::Transport(e))
            }
        }
    }
}

fn set_bearer(request: &mut Request, token: &str) -> Result<()> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
        ClientError::InvalidRequest("access token is not a valid header value".to_string())
    })?;
    value.set_sensitive(true);
    request.headers_mut().insert(AUTHORIZATION, value);
    Ok(())
}

/// Map a final response to `ApiResponse` or `ClientError::Http`
async fn read_response(response: Response) -> Result<ApiResponse> {
    let status = response.status();
    let url = response.url().clone();

    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        tracing::error!(
            status = status.as_u16(),
            url = %url,
            response_body = %error_text,
            "HTTP request failed with error response"
        );
        return Err(ClientError::Http {
            status: status.as_u16(),
            message: error_text,
        });
    }

    if status == StatusCode::NO_CONTENT {
        return Ok(ApiResponse::Empty);
    }

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("application/json"))
        .unwrap_or(false);

    let text = response.text().await?;
    if is_json {
        Ok(ApiResponse::Json(serde_json::from_str(&text)?))
    } else {
        Ok(ApiResponse::Text(text))
    }
}
