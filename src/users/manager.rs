/// User account and session management
use crate::{
    config::ServerConfig,
    db::models::{Session, User},
    error::{VaultError, VaultResult},
    users::ValidatedSession,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

/// User manager service
pub struct UserManager {
    db: SqlitePool,
    config: Arc<ServerConfig>,
}

impl UserManager {
    pub fn new(db: SqlitePool, config: Arc<ServerConfig>) -> Self {
        Self { db, config }
    }

    /// Register a new user
    pub async fn register(&self, username: &str, password: &str) -> VaultResult<User> {
        Self::validate_username(username)?;

        if password.len() < 8 {
            return Err(VaultError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if self.username_exists(username).await? {
            return Err(VaultError::Conflict(format!(
                "Username {} already taken",
                username
            )));
        }

        let password_hash = Self::hash_password(password)?;
        let is_admin = self
            .config
            .authentication
            .admin_usernames
            .iter()
            .any(|u| u == username);

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO user (id, username, password_hash, is_admin, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&id)
        .bind(username)
        .bind(&password_hash)
        .bind(is_admin)
        .bind(now)
        .execute(&self.db)
        .await?;

        tracing::info!(user_id = %id, username, "Registered user");

        Ok(User {
            id,
            username: username.to_string(),
            password_hash,
            is_admin,
            created_at: now,
        })
    }

    /// Authenticate and create a session
    pub async fn login(&self, username: &str, password: &str) -> VaultResult<(User, Session)> {
        let user = match self.get_user_by_username(username).await {
            Ok(user) => user,
            Err(VaultError::NotFound(_)) => {
                return Err(VaultError::Authentication("Invalid credentials".to_string()))
            }
            Err(e) => return Err(e),
        };

        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| VaultError::Internal(format!("Corrupt password hash: {}", e)))?;

        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(VaultError::Authentication("Invalid credentials".to_string()));
        }

        let session = self.create_session(&user.id).await?;

        Ok((user, session))
    }

    /// Create a session for a user id
    pub async fn create_session(&self, user_id: &str) -> VaultResult<Session> {
        let session_id = Uuid::new_v4().to_string();
        let access_token = self.generate_access_token(user_id, &session_id)?;

        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.config.authentication.session_ttl);

        sqlx::query(
            "INSERT INTO session (id, user_id, access_token, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&session_id)
        .bind(user_id)
        .bind(&access_token)
        .bind(now)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(Session {
            id: session_id,
            user_id: user_id.to_string(),
            access_token,
            created_at: now,
            expires_at,
        })
    }

    /// Validate a bearer token and return session info
    pub async fn validate_access_token(&self, token: &str) -> VaultResult<ValidatedSession> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, user_id, access_token, created_at, expires_at
             FROM session WHERE access_token = ?1",
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await
        .map_err(VaultError::Database)?
        .ok_or_else(|| VaultError::Authentication("Invalid or expired session".to_string()))?;

        if Utc::now() > session.expires_at {
            return Err(VaultError::Authentication("Session expired".to_string()));
        }

        let user = self.get_user(&session.user_id).await?;

        let is_admin = user.is_admin
            || self
                .config
                .authentication
                .admin_usernames
                .iter()
                .any(|u| u == &user.username);

        Ok(ValidatedSession {
            user_id: user.id,
            username: user.username,
            session_id: session.id,
            is_admin,
        })
    }

    /// Delete a session (logout)
    pub async fn delete_session(&self, session_id: &str) -> VaultResult<()> {
        sqlx::query("DELETE FROM session WHERE id = ?1")
            .bind(session_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Get user by id
    pub async fn get_user(&self, id: &str) -> VaultResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, is_admin, created_at FROM user WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(VaultError::Database)?
        .ok_or_else(|| VaultError::NotFound("User not found".to_string()))
    }

    /// Get user by username
    pub async fn get_user_by_username(&self, username: &str) -> VaultResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, is_admin, created_at FROM user WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .map_err(VaultError::Database)?
        .ok_or_else(|| VaultError::NotFound("User not found".to_string()))
    }

    async fn username_exists(&self, username: &str) -> VaultResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user WHERE username = ?1")
            .bind(username)
            .fetch_one(&self.db)
            .await?;

        Ok(count > 0)
    }

    fn hash_password(password: &str) -> VaultResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| VaultError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Generate access JWT token
    fn generate_access_token(&self, user_id: &str, session_id: &str) -> VaultResult<String> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        use serde::{Deserialize, Serialize};

        #[derive(Debug, Serialize, Deserialize)]
        struct Claims {
            sub: String,
            sid: String,
            iat: i64,
            exp: i64,
        }

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            sid: session_id.to_string(),
            iat: now,
            exp: now + self.config.authentication.session_ttl,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.authentication.jwt_secret.as_bytes()),
        )
        .map_err(|e| VaultError::Jwt(format!("Failed to generate token: {}", e)))
    }

    fn validate_username(username: &str) -> VaultResult<()> {
        if username.len() < 3 {
            return Err(VaultError::Validation(
                "Username must be at least 3 characters".to_string(),
            ));
        }

        if username.len() > 32 {
            return Err(VaultError::Validation("Username too long".to_string()));
        }

        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(VaultError::Validation(
                "Username contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::*;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::path::PathBuf;

    async fn setup_manager(admin_usernames: Vec<String>) -> UserManager {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();
        crate::db::run_migrations(&db).await.unwrap();

        let config = Arc::new(ServerConfig {
            service: ServiceConfig {
                hostname: "localhost".to_string(),
                port: 8730,
                save_upload_limit: 1024,
            },
            storage: StorageConfig {
                data_directory: PathBuf::from("./data"),
                database: PathBuf::from(":memory:"),
                save_directory: PathBuf::from("./data/saves"),
            },
            authentication: AuthConfig {
                jwt_secret: "test-secret-key-that-is-long-enough!".to_string(),
                admin_usernames,
                session_ttl: 3600,
            },
            leasing: LeaseConfig { max_hours: 24 },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        });

        UserManager::new(db, config)
    }

    #[tokio::test]
    async fn test_register_login_validate() {
        let manager = setup_manager(vec![]).await;

        let user = manager.register("alice", "password123").await.unwrap();
        assert!(!user.is_admin);

        let (login_user, session) = manager.login("alice", "password123").await.unwrap();
        assert_eq!(login_user.id, user.id);

        let validated = manager
            .validate_access_token(&session.access_token)
            .await
            .unwrap();
        assert_eq!(validated.user_id, user.id);
        assert_eq!(validated.username, "alice");
        assert!(!validated.is_admin);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let manager = setup_manager(vec![]).await;
        manager.register("alice", "password123").await.unwrap();

        assert!(matches!(
            manager.login("alice", "wrong-password").await,
            Err(VaultError::Authentication(_))
        ));
        assert!(matches!(
            manager.login("nobody", "password123").await,
            Err(VaultError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_username_conflict() {
        let manager = setup_manager(vec![]).await;
        manager.register("alice", "password123").await.unwrap();

        assert!(matches!(
            manager.register("alice", "password456").await,
            Err(VaultError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_configured_admin_flag() {
        let manager = setup_manager(vec!["root".to_string()]).await;

        let user = manager.register("root", "password123").await.unwrap();
        assert!(user.is_admin);

        let (_, session) = manager.login("root", "password123").await.unwrap();
        let validated = manager
            .validate_access_token(&session.access_token)
            .await
            .unwrap();
        assert!(validated.is_admin);
    }

    #[tokio::test]
    async fn test_expired_session_rejected() {
        let manager = setup_manager(vec![]).await;
        let user = manager.register("alice", "password123").await.unwrap();

        // Insert a session that expired an hour ago
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO session (id, user_id, access_token, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind("expired-session")
        .bind(&user.id)
        .bind("expired-token")
        .bind(now - Duration::hours(2))
        .bind(now - Duration::hours(1))
        .execute(&manager.db)
        .await
        .unwrap();

        assert!(matches!(
            manager.validate_access_token("expired-token").await,
            Err(VaultError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn test_logout_invalidates_token() {
        let manager = setup_manager(vec![]).await;
        manager.register("alice", "password123").await.unwrap();
        let (_, session) = manager.login("alice", "password123").await.unwrap();

        manager.delete_session(&session.id).await.unwrap();

        assert!(manager
            .validate_access_token(&session.access_token)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_username_validation() {
        let manager = setup_manager(vec![]).await;

        assert!(manager.register("ab", "password123").await.is_err());
        assert!(manager.register("bad name", "password123").await.is_err());
        assert!(manager.register(&"a".repeat(33), "password123").await.is_err());
        assert!(manager.register("alice", "short").await.is_err());
    }
}
