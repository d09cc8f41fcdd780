/// GameVault - game distribution and save-file sharing server
///
/// Serves a game catalog with download links, save-file backups, and a pool
/// of shared Steam credentials with time-boxed exclusive leasing.

mod api;
mod auth;
mod config;
mod context;
mod db;
mod error;
mod games;
mod lease;
mod saves;
mod server;
mod users;

pub use context::AppContext;

use config::ServerConfig;
use error::VaultResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> VaultResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gamevault=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    print_banner();

    // Load configuration
    let config = ServerConfig::from_env()?;

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
   ______                   _    __            ____
  / ____/___ _____ ___  ___| |  / /___ ___  __/ / /_
 / / __/ __ `/ __ `__ \/ _ \ | / / __ `/ / / / / __/
/ /_/ / /_/ / / / / / /  __/ |/ / /_/ / /_/ / / /_
\____/\__,_/_/ /_/ /_/\___/|___/\__,_/\__,_/_/\__/

        Game distribution server v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
