/// Database layer for GameVault
///
/// Manages the SQLite connection pool and schema, and defines the typed
/// row models shared across managers.

pub mod models;

use crate::error::{VaultError, VaultResult};
use sqlx::sqlite::SqlitePool;
use std::path::Path;

/// Database connection options
#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub max_connections: u32,
    pub enable_wal: bool,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            enable_wal: true,
        }
    }
}

/// Create a SQLite connection pool
pub async fn create_pool(path: &Path, options: DatabaseOptions) -> VaultResult<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(options.max_connections)
        .connect_with(
            sqlx::sqlite::SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(if options.enable_wal {
                    sqlx::sqlite::SqliteJournalMode::Wal
                } else {
                    sqlx::sqlite::SqliteJournalMode::Delete
                })
                .foreign_keys(true)
                .busy_timeout(std::time::Duration::from_secs(5)),
        )
        .await
        .map_err(VaultError::Database)?;

    Ok(pool)
}

/// Create the schema if it does not exist yet
///
/// Statements are idempotent so this can run on every startup.
pub async fn run_migrations(pool: &SqlitePool) -> VaultResult<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS user (
            id TEXT PRIMARY KEY,
            username TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            is_admin BOOLEAN NOT NULL DEFAULT 0,
            created_at DATETIME NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS session (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            access_token TEXT UNIQUE NOT NULL,
            created_at DATETIME NOT NULL,
            expires_at DATETIME NOT NULL,
            FOREIGN KEY (user_id) REFERENCES user(id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS game (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            slug TEXT UNIQUE NOT NULL,
            description TEXT,
            cover_url TEXT,
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS download_link (
            id TEXT PRIMARY KEY,
            game_id TEXT NOT NULL,
            label TEXT NOT NULL,
            url TEXT NOT NULL,
            created_at DATETIME NOT NULL,
            FOREIGN KEY (game_id) REFERENCES game(id) ON DELETE CASCADE
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS shared_account (
            id TEXT PRIMARY KEY,
            game_id TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('offline', 'online')),
            username TEXT NOT NULL,
            secret TEXT NOT NULL,
            guard_link TEXT,
            lease_holder TEXT,
            lease_expires_at DATETIME,
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL,
            FOREIGN KEY (game_id) REFERENCES game(id) ON DELETE CASCADE
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS save_file (
            id TEXT PRIMARY KEY,
            game_id TEXT NOT NULL,
            owner_id TEXT NOT NULL,
            file_name TEXT NOT NULL,
            size_bytes INTEGER NOT NULL,
            sha256 TEXT NOT NULL,
            note TEXT,
            created_at DATETIME NOT NULL,
            FOREIGN KEY (game_id) REFERENCES game(id) ON DELETE CASCADE,
            FOREIGN KEY (owner_id) REFERENCES user(id)
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_shared_account_game ON shared_account(game_id)",
        "CREATE INDEX IF NOT EXISTS idx_download_link_game ON download_link(game_id)",
        "CREATE INDEX IF NOT EXISTS idx_save_file_game ON save_file(game_id)",
        "CREATE INDEX IF NOT EXISTS idx_session_token ON session(access_token)",
    ];

    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| VaultError::Internal(format!("Migration failed: {}", e)))?;
    }

    Ok(())
}

/// Test database connection
pub async fn test_connection(pool: &SqlitePool) -> VaultResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(VaultError::Database)?;

    Ok(())
}
