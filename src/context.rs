/// Application context and dependency injection
use crate::{
    config::ServerConfig,
    db,
    error::VaultResult,
    games::GameManager,
    lease::{AccountStore, LeaseEngine},
    saves::SaveManager,
    users::UserManager,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub user_manager: Arc<UserManager>,
    pub game_manager: Arc<GameManager>,
    pub save_manager: Arc<SaveManager>,
    pub lease_engine: Arc<LeaseEngine>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> VaultResult<Self> {
        config.validate()?;

        // Ensure data directories exist
        tokio::fs::create_dir_all(&config.storage.data_directory).await?;
        tokio::fs::create_dir_all(&config.storage.save_directory).await?;

        let pool = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;
        db::run_migrations(&pool).await?;
        db::test_connection(&pool).await?;

        let config = Arc::new(config);

        let user_manager = Arc::new(UserManager::new(pool.clone(), Arc::clone(&config)));
        let game_manager = Arc::new(GameManager::new(pool.clone()));
        let save_manager = Arc::new(SaveManager::new(
            pool.clone(),
            config.storage.save_directory.clone(),
            config.service.save_upload_limit,
        ));
        let lease_engine = Arc::new(LeaseEngine::new(
            AccountStore::new(pool.clone()),
            config.leasing.max_hours,
        ));

        Ok(Self {
            config,
            db: pool,
            user_manager,
            game_manager,
            save_manager,
            lease_engine,
        })
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
