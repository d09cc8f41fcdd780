/// Database row models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Whether a shared credential is restricted to one holder at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AccountKind {
    /// No concurrency restriction; always available
    Offline,
    /// At most one non-expired lease at any instant
    Online,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Offline => "offline",
            AccountKind::Online => "online",
        }
    }
}

/// Shared credential record
///
/// `lease_holder` and `lease_expires_at` are only ever set for online
/// accounts, and a stored holder whose expiry has passed is treated as
/// absent by every read path.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SharedAccount {
    pub id: String,
    pub game_id: String,
    pub kind: AccountKind,
    pub username: String,
    pub secret: String,
    pub guard_link: Option<String>,
    pub lease_holder: Option<String>,
    pub lease_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SharedAccount {
    /// Whether the account is claimable at `now`
    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        match self.kind {
            AccountKind::Offline => true,
            AccountKind::Online => match (self.lease_holder.as_ref(), self.lease_expires_at) {
                (Some(_), Some(expires_at)) => now >= expires_at,
                _ => true,
            },
        }
    }
}

/// Game catalog entry
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Install/download link attached to a game
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DownloadLink {
    pub id: String,
    pub game_id: String,
    pub label: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Save-file backup metadata; the bytes live on disk keyed by `id`
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SaveFile {
    pub id: String,
    pub game_id: String,
    pub owner_id: String,
    pub file_name: String,
    pub size_bytes: i64,
    pub sha256: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Registered user
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Session record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
