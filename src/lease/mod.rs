/// Shared-credential leasing
///
/// Mediates exclusive, time-boxed access to online-type shared accounts and
/// answers availability queries for both account kinds. Expiry is evaluated
/// lazily at read time; no background sweep exists.

mod engine;
mod store;

pub use engine::LeaseEngine;
pub use store::{AccountStore, NewSharedAccount};

use crate::db::models::AccountKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Availability view of a shared account
///
/// Never carries the credential payload; holder and remaining time are only
/// present while an online account is actively leased.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountStatus {
    pub account_id: String,
    pub game_id: String,
    pub kind: AccountKind,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_remaining: Option<i64>,
}

/// Account view returned from assign/release, including the lease fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeasedAccount {
    pub id: String,
    pub game_id: String,
    pub kind: AccountKind,
    pub username: String,
    pub secret: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guard_link: Option<String>,
    pub lease_holder: Option<String>,
    pub lease_expires_at: Option<DateTime<Utc>>,
}

impl From<crate::db::models::SharedAccount> for LeasedAccount {
    fn from(account: crate::db::models::SharedAccount) -> Self {
        Self {
            id: account.id,
            game_id: account.game_id,
            kind: account.kind,
            username: account.username,
            secret: account.secret,
            guard_link: account.guard_link,
            lease_holder: account.lease_holder,
            lease_expires_at: account.lease_expires_at,
        }
    }
}
