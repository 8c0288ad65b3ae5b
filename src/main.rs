use anyhow::{Context, Result};
use dialoguer::Password;
use std::sync::Arc;

use tourney_client::auth::{token_preview, AuthManager, LoginRedirect, SqliteCredentialStore};
use tourney_client::config::{self, Command};
use tourney_client::http_client::{build_http_client, ApiClient, ApiResponse, RequestOptions};
use tourney_client::{ClientError, CredentialStore, HttpMethod};

#[tokio::main]
async fn main() -> Result<()> {
    let (config, command) = config::Config::load()?;
    config.validate()?;

    // Initialize logging with a configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(
        base_url = %config.api_base_url,
        db_file = %config.credentials_db_file.display(),
        "Configuration loaded"
    );

    let store = Arc::new(SqliteCredentialStore::open(&config.credentials_db_file)?);
    let client = build_http_client(config.http_max_connections)?;
    let auth_manager = Arc::new(AuthManager::new(
        store.clone(),
        client.clone(),
        config.api_base_url.clone(),
        Arc::new(LoginRedirect::new(config.login_url.clone())),
    ));
    let api = ApiClient::new(client, auth_manager.clone());

    match command {
        Command::Request { method, url, data } => {
            let method: HttpMethod = method.parse()?;
            let mut options = RequestOptions::new(method);
            if let Some(data) = data {
                let body: serde_json::Value =
                    serde_json::from_str(&data).context("--data is not valid JSON")?;
                options = options.json(&body)?;
            }

            match api.request(&url, options).await {
                Ok(ApiResponse::Json(value)) => {
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
                Ok(ApiResponse::Text(text)) => println!("{}", text),
                Ok(ApiResponse::Empty) => eprintln!("(no content)"),
                Err(ClientError::SessionExpired) => {
                    anyhow::bail!("Session expired. Log in again: {}", config.login_url);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Command::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => Password::new()
                    .with_prompt(format!("Password for {}", username))
                    .interact()
                    .context("Failed to read password")?,
            };

            auth_manager.login(&username, &password).await?;
            println!("✅ Logged in as {}", username);
        }

        Command::Logout => {
            auth_manager.logout().await?;
            println!("Logged out");
        }

        Command::Status => {
            let stored = store.get()?;
            match stored.access_token.as_deref() {
                Some(token) => println!("Logged in (access token {})", token_preview(token)),
                None => println!("Not logged in"),
            }
            if stored.access_token.is_some() && stored.refresh_token.is_none() {
                println!("No refresh token stored; the session cannot be renewed");
            }
        }
    }

    Ok(())
}
