// Tournament API client - library root

pub mod auth;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http_client;

pub use auth::{AuthManager, CredentialStore, MemoryCredentialStore, SqliteCredentialStore};
pub use error::ClientError;
pub use http_client::{ApiClient, ApiResponse, HttpMethod, RequestOptions};
