/// API routes and handlers
pub mod accounts;
pub mod admin;
pub mod games;
pub mod middleware;
pub mod saves;
pub mod session;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(session::routes())
        .merge(games::routes())
        .merge(accounts::routes())
        .merge(saves::routes())
        .merge(admin::routes())
}
