/// Persistence for shared credential records
///
/// All lease-field mutations go through the conditional updates here so the
/// at-most-one-holder invariant is enforced at the store, not by callers
/// trusting their own reads.
use crate::{
    db::models::{AccountKind, SharedAccount},
    error::{VaultError, VaultResult},
};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Fields for creating a shared account (admin operation)
#[derive(Debug, Clone)]
pub struct NewSharedAccount {
    pub game_id: String,
    pub kind: AccountKind,
    pub username: String,
    pub secret: String,
    pub guard_link: Option<String>,
}

/// Store over the `shared_account` table
#[derive(Clone)]
pub struct AccountStore {
    db: SqlitePool,
}

impl AccountStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Get a shared account by id
    pub async fn get(&self, id: &str) -> VaultResult<SharedAccount> {
        sqlx::query_as::<_, SharedAccount>(
            "SELECT id, game_id, kind, username, secret, guard_link,
                    lease_holder, lease_expires_at, created_at, updated_at
             FROM shared_account WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(VaultError::Database)?
        .ok_or_else(|| VaultError::NotFound("Shared account not found".to_string()))
    }

    /// List all shared accounts under a game, in creation order
    pub async fn list_by_game(&self, game_id: &str) -> VaultResult<Vec<SharedAccount>> {
        let accounts = sqlx::query_as::<_, SharedAccount>(
            "SELECT id, game_id, kind, username, secret, guard_link,
                    lease_holder, lease_expires_at, created_at, updated_at
             FROM shared_account WHERE game_id = ?1 ORDER BY created_at",
        )
        .bind(game_id)
        .fetch_all(&self.db)
        .await?;

        Ok(accounts)
    }

    /// List every shared account (admin overview)
    pub async fn list_all(&self) -> VaultResult<Vec<SharedAccount>> {
        let accounts = sqlx::query_as::<_, SharedAccount>(
            "SELECT id, game_id, kind, username, secret, guard_link,
                    lease_holder, lease_expires_at, created_at, updated_at
             FROM shared_account ORDER BY created_at",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(accounts)
    }

    /// Create a shared account with no lease
    pub async fn create(&self, new: NewSharedAccount) -> VaultResult<SharedAccount> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO shared_account (id, game_id, kind, username, secret, guard_link,
                                         lease_holder, lease_expires_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, NULL, ?7, ?8)",
        )
        .bind(&id)
        .bind(&new.game_id)
        .bind(new.kind)
        .bind(&new.username)
        .bind(&new.secret)
        .bind(&new.guard_link)
        .bind(now)
        .bind(now)
        .execute(&self.db)
        .await?;

        Ok(SharedAccount {
            id,
            game_id: new.game_id,
            kind: new.kind,
            username: new.username,
            secret: new.secret,
            guard_link: new.guard_link,
            lease_holder: None,
            lease_expires_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Delete a shared account outright, leased or not (admin operation)
    pub async fn delete(&self, id: &str) -> VaultResult<()> {
        let result = sqlx::query("DELETE FROM shared_account WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(VaultError::NotFound("Shared account not found".to_string()));
        }

        Ok(())
    }

    /// Conditionally claim a lease
    ///
    /// The WHERE clause re-validates availability against the stored row, so
    /// two concurrent claims on the same account cannot both succeed: the
    /// write only lands if no holder is stored or the stored expiry is
    /// already in the past at `now`. Returns false when the guard rejected
    /// the write.
    pub async fn try_claim(
        &self,
        id: &str,
        holder: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> VaultResult<bool> {
        let result = sqlx::query(
            "UPDATE shared_account
             SET lease_holder = ?1, lease_expires_at = ?2, updated_at = ?3
             WHERE id = ?4
               AND kind = 'online'
               AND (lease_holder IS NULL OR lease_expires_at IS NULL OR lease_expires_at <= ?5)",
        )
        .bind(holder)
        .bind(expires_at)
        .bind(now)
        .bind(id)
        .bind(now)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clear a lease, conditional on the stored holder
    ///
    /// Returns false if the row no longer names `holder`, in which case
    /// nothing was changed.
    pub async fn clear_lease(&self, id: &str, holder: &str) -> VaultResult<bool> {
        let result = sqlx::query(
            "UPDATE shared_account
             SET lease_holder = NULL, lease_expires_at = NULL, updated_at = ?1
             WHERE id = ?2 AND lease_holder = ?3",
        )
        .bind(Utc::now())
        .bind(id)
        .bind(holder)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sqlx::sqlite::SqlitePoolOptions;

    // Single connection so every query sees the same in-memory database.
    async fn setup_store() -> AccountStore {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();
        crate::db::run_migrations(&db).await.unwrap();

        // Parent rows for the accounts the tests hang off
        for game_id in ["game-1", "game-2"] {
            seed_game(&db, game_id).await;
        }

        AccountStore::new(db)
    }

    async fn seed_game(db: &SqlitePool, id: &str) {
        sqlx::query(
            "INSERT INTO game (id, title, slug, created_at, updated_at)
             VALUES (?1, ?2, ?1, ?3, ?3)",
        )
        .bind(id)
        .bind("Test Game")
        .bind(Utc::now())
        .execute(db)
        .await
        .unwrap();
    }

    fn online_account(game_id: &str) -> NewSharedAccount {
        NewSharedAccount {
            game_id: game_id.to_string(),
            kind: AccountKind::Online,
            username: "steam_user".to_string(),
            secret: "hunter2".to_string(),
            guard_link: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = setup_store().await;

        let created = store.create(online_account("game-1")).await.unwrap();
        assert!(created.lease_holder.is_none());
        assert!(created.lease_expires_at.is_none());

        let fetched = store.get(&created.id).await.unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.kind, AccountKind::Online);
        assert_eq!(fetched.username, "steam_user");
    }

    #[tokio::test]
    async fn test_create_requires_existing_game() {
        let store = setup_store().await;

        let result = store.create(online_account("no-such-game")).await;
        assert!(matches!(result, Err(VaultError::Database(_))));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = setup_store().await;

        match store.get("no-such-id").await {
            Err(VaultError::NotFound(_)) => {}
            other => panic!("Expected NotFound, got {:?}", other.map(|a| a.id)),
        }
    }

    #[tokio::test]
    async fn test_try_claim_rejects_active_lease() {
        let store = setup_store().await;
        let account = store.create(online_account("game-1")).await.unwrap();
        let now = Utc::now();

        let claimed = store
            .try_claim(&account.id, "u1", now + Duration::hours(2), now)
            .await
            .unwrap();
        assert!(claimed);

        // Second claim while the first lease is active must be rejected by
        // the store guard regardless of what the caller read earlier.
        let claimed = store
            .try_claim(&account.id, "u2", now + Duration::hours(1), now)
            .await
            .unwrap();
        assert!(!claimed);

        let fetched = store.get(&account.id).await.unwrap();
        assert_eq!(fetched.lease_holder.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_try_claim_overwrites_expired_lease() {
        let store = setup_store().await;
        let account = store.create(online_account("game-1")).await.unwrap();
        let now = Utc::now();

        let claimed = store
            .try_claim(&account.id, "u1", now - Duration::minutes(5), now - Duration::hours(1))
            .await
            .unwrap();
        assert!(claimed);

        let claimed = store
            .try_claim(&account.id, "u2", now + Duration::hours(1), now)
            .await
            .unwrap();
        assert!(claimed);

        let fetched = store.get(&account.id).await.unwrap();
        assert_eq!(fetched.lease_holder.as_deref(), Some("u2"));
    }

    #[tokio::test]
    async fn test_try_claim_never_touches_offline() {
        let store = setup_store().await;
        let mut new = online_account("game-1");
        new.kind = AccountKind::Offline;
        let account = store.create(new).await.unwrap();
        let now = Utc::now();

        let claimed = store
            .try_claim(&account.id, "u1", now + Duration::hours(1), now)
            .await
            .unwrap();
        assert!(!claimed);

        let fetched = store.get(&account.id).await.unwrap();
        assert!(fetched.lease_holder.is_none());
    }

    #[tokio::test]
    async fn test_clear_lease_checks_holder() {
        let store = setup_store().await;
        let account = store.create(online_account("game-1")).await.unwrap();
        let now = Utc::now();

        store
            .try_claim(&account.id, "u1", now + Duration::hours(2), now)
            .await
            .unwrap();

        assert!(!store.clear_lease(&account.id, "u2").await.unwrap());
        let fetched = store.get(&account.id).await.unwrap();
        assert_eq!(fetched.lease_holder.as_deref(), Some("u1"));

        assert!(store.clear_lease(&account.id, "u1").await.unwrap());
        let fetched = store.get(&account.id).await.unwrap();
        assert!(fetched.lease_holder.is_none());
        assert!(fetched.lease_expires_at.is_none());
    }

    #[tokio::test]
    async fn test_list_by_game_in_creation_order() {
        let store = setup_store().await;

        let first = store.create(online_account("game-1")).await.unwrap();
        let second = store.create(online_account("game-1")).await.unwrap();
        store.create(online_account("game-2")).await.unwrap();

        let accounts = store.list_by_game("game-1").await.unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].id, first.id);
        assert_eq!(accounts[1].id, second.id);
    }

    #[tokio::test]
    async fn test_delete_leased_account() {
        let store = setup_store().await;
        let account = store.create(online_account("game-1")).await.unwrap();
        let now = Utc::now();

        store
            .try_claim(&account.id, "u1", now + Duration::hours(2), now)
            .await
            .unwrap();

        // Admin deletion ignores lease state
        store.delete(&account.id).await.unwrap();
        assert!(matches!(
            store.get(&account.id).await,
            Err(VaultError::NotFound(_))
        ));
    }
}
