/// Configuration management for GameVault
use crate::error::{VaultError, VaultResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub authentication: AuthConfig,
    pub leasing: LeaseConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub save_upload_limit: usize,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database: PathBuf,
    pub save_directory: PathBuf,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Usernames granted admin access in addition to rows flagged in the database
    pub admin_usernames: Vec<String>,
    /// Access token lifetime in seconds
    pub session_ttl: i64,
}

/// Credential leasing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseConfig {
    /// Upper bound on the hours a lease may be requested for
    pub max_hours: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> VaultResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("GV_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("GV_PORT")
            .unwrap_or_else(|_| "8730".to_string())
            .parse()
            .map_err(|_| VaultError::Validation("Invalid port number".to_string()))?;
        let save_upload_limit = env::var("GV_SAVE_UPLOAD_LIMIT")
            .unwrap_or_else(|_| "52428800".to_string())
            .parse()
            .unwrap_or(52428800);

        let data_directory: PathBuf = env::var("GV_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let database = env::var("GV_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("gamevault.sqlite"));
        let save_directory = env::var("GV_SAVE_DIRECTORY")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("saves"));

        let jwt_secret = env::var("GV_JWT_SECRET")
            .map_err(|_| VaultError::Validation("JWT secret required".to_string()))?;

        // Parse admin usernames from comma-separated list
        let admin_usernames = env::var("GV_ADMIN_USERNAMES")
            .unwrap_or_else(|_| String::new())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<String>>();

        let session_ttl = env::var("GV_SESSION_TTL")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .unwrap_or(86400);

        let max_hours = env::var("GV_LEASE_MAX_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .unwrap_or(24);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                save_upload_limit,
            },
            storage: StorageConfig {
                data_directory,
                database,
                save_directory,
            },
            authentication: AuthConfig {
                jwt_secret,
                admin_usernames,
                session_ttl,
            },
            leasing: LeaseConfig { max_hours },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> VaultResult<()> {
        if self.service.hostname.is_empty() {
            return Err(VaultError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.authentication.jwt_secret.len() < 32 {
            return Err(VaultError::Validation(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        if self.leasing.max_hours < 1 {
            return Err(VaultError::Validation(
                "Lease max hours must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
