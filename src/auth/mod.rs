// Authentication module
// Credential storage, token refresh and session lifecycle

mod credentials;
mod manager;
mod refresh;
mod session;
mod store;
mod types;

pub use credentials::SqliteCredentialStore;
pub use manager::AuthManager;
pub use session::{LoginRedirect, SessionExpiredHandler};
pub use store::{CredentialStore, MemoryCredentialStore};
pub use types::{
    token_preview, CredentialPair, StoredCredentials, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY,
};
