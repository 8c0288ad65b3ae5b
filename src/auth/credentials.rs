// Persistent credential store backed by SQLite

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use super::store::CredentialStore;
use super::types::{CredentialPair, StoredCredentials, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

const CREATE_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS auth_kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)";

/// Credential store persisted in an `auth_kv` key/value table
pub struct SqliteCredentialStore {
    conn: Mutex<Connection>,
}

impl SqliteCredentialStore {
    /// Open (or create) the credentials database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create credentials directory: {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite database: {}", path.display()))?;
        tracing::debug!("Opened credentials database: {}", path.display());
        Self::from_connection(conn)
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory SQLite")?;
        Self::from_connection(conn)
    }

    /// Wrap an already open connection, creating `auth_kv` if it is missing
    pub fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(CREATE_TABLE, [])
            .context("Failed to create auth_kv table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn read_key(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row("SELECT value FROM auth_kv WHERE key = ?", [key], |row| {
            row.get(0)
        })
        .optional()
        .with_context(|| format!("Failed to load {} from SQLite", key))
    }
}

impl CredentialStore for SqliteCredentialStore {
    fn get(&self) -> Result<StoredCredentials> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("Credentials database lock poisoned"))?;

        Ok(StoredCredentials {
            access_token: Self::read_key(&conn, ACCESS_TOKEN_KEY)?,
            refresh_token: Self::read_key(&conn, REFRESH_TOKEN_KEY)?,
        })
    }

    fn set(&self, pair: &CredentialPair) -> Result<()> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("Credentials database lock poisoned"))?;

        let tx = conn.transaction().context("Failed to begin transaction")?;
        for (key, value) in [
            (ACCESS_TOKEN_KEY, &pair.access_token),
            (REFRESH_TOKEN_KEY, &pair.refresh_token),
        ] {
            tx.execute(
                "INSERT OR REPLACE INTO auth_kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .with_context(|| format!("Failed to write {} to SQLite", key))?;
        }
        tx.commit().context("Failed to commit credential pair")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("Credentials database lock poisoned"))?;

        let tx = conn.transaction().context("Failed to begin transaction")?;
        tx.execute(
            "DELETE FROM auth_kv WHERE key IN (?1, ?2)",
            params![ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY],
        )
        .context("Failed to delete credentials from SQLite")?;
        tx.commit().context("Failed to commit credential removal")?;
        Ok(())
    }
}
