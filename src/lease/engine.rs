/// Leasing engine for shared online accounts
///
/// Enforces the at-most-one-holder invariant through the store's conditional
/// claim, computes expiry from the requested hours, and reclaims expired
/// leases lazily on the next read.
use crate::{
    db::models::AccountKind,
    error::{VaultError, VaultResult},
    lease::{store::AccountStore, AccountStatus, LeasedAccount},
};
use chrono::{DateTime, Duration, Utc};

/// Leasing engine service
#[derive(Clone)]
pub struct LeaseEngine {
    store: AccountStore,
    max_hours: i64,
}

impl LeaseEngine {
    pub fn new(store: AccountStore, max_hours: i64) -> Self {
        Self { store, max_hours }
    }

    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    /// Claim an online account for `hours` on behalf of `requester_id`
    ///
    /// The availability decision made here is advisory; the store's
    /// conditional write re-validates it, so a race lost between the read
    /// and the write still surfaces as a conflict and never a double lease.
    pub async fn assign(
        &self,
        account_id: &str,
        requester_id: &str,
        hours: i64,
    ) -> VaultResult<LeasedAccount> {
        if hours < 1 || hours > self.max_hours {
            return Err(VaultError::Validation(format!(
                "Hours must be between 1 and {}",
                self.max_hours
            )));
        }

        let account = self.store.get(account_id).await?;

        if account.kind == AccountKind::Offline {
            return Err(VaultError::Validation(
                "Offline accounts do not need assignment".to_string(),
            ));
        }

        let now = Utc::now();
        if let Some(conflict) = Self::active_lease_conflict(&account, now) {
            return Err(conflict);
        }

        let expires_at = now + Duration::hours(hours);
        let claimed = self
            .store
            .try_claim(account_id, requester_id, expires_at, now)
            .await?;

        if !claimed {
            // Lost the race; report whoever won it.
            let current = self.store.get(account_id).await?;
            return Err(Self::active_lease_conflict(&current, Utc::now()).unwrap_or_else(|| {
                VaultError::Conflict("Account is currently in use".to_string())
            }));
        }

        tracing::info!(
            account_id,
            requester_id,
            hours,
            "Assigned shared account"
        );

        Ok(self.store.get(account_id).await?.into())
    }

    /// Release a lease held by `requester_id`
    pub async fn release(&self, account_id: &str, requester_id: &str) -> VaultResult<LeasedAccount> {
        let account = self.store.get(account_id).await?;

        let now = Utc::now();
        let holds_lease = account.kind == AccountKind::Online
            && account.lease_holder.as_deref() == Some(requester_id)
            && account.lease_expires_at.is_some_and(|expires_at| expires_at > now);

        if !holds_lease {
            return Err(VaultError::Authorization(
                "You are not using this account".to_string(),
            ));
        }

        let cleared = self.store.clear_lease(account_id, requester_id).await?;
        if !cleared {
            // Holder changed between the read and the write
            return Err(VaultError::Authorization(
                "You are not using this account".to_string(),
            ));
        }

        tracing::info!(account_id, requester_id, "Released shared account");

        Ok(self.store.get(account_id).await?.into())
    }

    /// Availability view for a single account; never mutates
    pub async fn status(&self, account_id: &str) -> VaultResult<AccountStatus> {
        let account = self.store.get(account_id).await?;
        Ok(Self::status_view(&account, Utc::now()))
    }

    /// Availability views for every account under a game, in store order
    pub async fn list_statuses_for_game(&self, game_id: &str) -> VaultResult<Vec<AccountStatus>> {
        let now = Utc::now();
        let accounts = self.store.list_by_game(game_id).await?;

        Ok(accounts
            .iter()
            .map(|account| Self::status_view(account, now))
            .collect())
    }

    fn active_lease_conflict(
        account: &crate::db::models::SharedAccount,
        now: DateTime<Utc>,
    ) -> Option<VaultError> {
        match (account.lease_holder.as_ref(), account.lease_expires_at) {
            (Some(holder), Some(expires_at)) if expires_at > now => {
                Some(VaultError::AccountInUse {
                    holder: holder.clone(),
                    seconds_remaining: (expires_at - now).num_seconds().max(0),
                })
            }
            _ => None,
        }
    }

    fn status_view(account: &crate::db::models::SharedAccount, now: DateTime<Utc>) -> AccountStatus {
        let available = account.is_available(now);

        let (holder, seconds_remaining) = if available {
            (None, None)
        } else {
            (
                account.lease_holder.clone(),
                account
                    .lease_expires_at
                    .map(|expires_at| (expires_at - now).num_seconds().max(0)),
            )
        };

        AccountStatus {
            account_id: account.id.clone(),
            game_id: account.game_id.clone(),
            kind: account.kind,
            available,
            holder,
            seconds_remaining,
        }
    }
}
