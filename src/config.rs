use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Url;
use std::path::PathBuf;

/// Default backend origin + path prefix
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8001/api";

/// Default authentication entry point
pub const DEFAULT_LOGIN_URL: &str = "/auth.html";

/// Tournament API client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Backend base URL
    #[arg(short = 'u', long, env = "API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub base_url: String,

    /// Path to the credentials SQLite database
    #[arg(short = 'd', long, env = "CREDENTIALS_DB_FILE")]
    pub db_file: Option<String>,

    /// Where to send the user when the session expires
    #[arg(long, env = "LOGIN_URL", default_value = DEFAULT_LOGIN_URL)]
    pub login_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Idle connections kept per host
    #[arg(long, env = "HTTP_MAX_CONNECTIONS", default_value = "10")]
    pub http_max_connections: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Send an authenticated request and print the response
    Request {
        /// GET, POST, PUT or DELETE
        method: String,

        /// Base-relative endpoint or absolute URL
        url: String,

        /// JSON body
        #[arg(long)]
        data: Option<String>,
    },

    /// Obtain and store a credential pair
    Login {
        username: String,

        /// Prompted for when omitted
        #[arg(long, env = "TOURNEY_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Revoke and forget stored credentials
    Logout,

    /// Show whether credentials are stored
    Status,
}

#[derive(Clone, Debug)]
pub struct Config {
    // Backend
    pub api_base_url: String,
    pub login_url: String,

    // Credentials
    pub credentials_db_file: PathBuf,

    // HTTP client
    pub http_max_connections: usize,

    // Logging
    pub log_level: String,
}

impl Config {
    /// Load configuration with priority: CLI > ENV > .env > defaults
    pub fn load() -> Result<(Self, Command)> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let args = CliArgs::parse();
        let config = Self::from_args(&args);
        Ok((config, args.command))
    }

    pub fn from_args(args: &CliArgs) -> Self {
        Config {
            api_base_url: args.base_url.trim_end_matches('/').to_string(),
            login_url: args.login_url.clone(),
            credentials_db_file: args
                .db_file
                .as_deref()
                .map(expand_tilde)
                .unwrap_or_else(default_credentials_db_path),
            http_max_connections: args.http_max_connections,
            log_level: args.log_level.clone(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_base_url)
            .with_context(|| format!("API_BASE_URL is not a valid URL: {}", self.api_base_url))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!(
                "API_BASE_URL must use http or https, got: {}",
                url.scheme()
            );
        }

        if self.http_max_connections == 0 {
            anyhow::bail!("HTTP_MAX_CONNECTIONS must be at least 1");
        }

        Ok(())
    }
}

/// Expand tilde (~) in file paths to user's home directory
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Per-user data directory, falling back to the working directory
fn default_credentials_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("tourney-client"))
        .unwrap_or_default()
        .join("credentials.sqlite3")
}
