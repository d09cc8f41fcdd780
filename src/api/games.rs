/// Public game catalog endpoints
use crate::{
    db::models::{DownloadLink, Game},
    error::VaultResult,
    AppContext,
};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

/// GET /api/games
pub async fn list_games(State(ctx): State<AppContext>) -> VaultResult<Json<Vec<Game>>> {
    Ok(Json(ctx.game_manager.list_games().await?))
}

/// GET /api/games/:id
pub async fn get_game(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> VaultResult<Json<Game>> {
    Ok(Json(ctx.game_manager.get_game(&id).await?))
}

/// GET /api/games/:id/links
pub async fn list_links(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> VaultResult<Json<Vec<DownloadLink>>> {
    // 404 for an unknown game rather than an empty list
    ctx.game_manager.get_game(&id).await?;

    Ok(Json(ctx.game_manager.list_links(&id).await?))
}

/// Build game catalog routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/games", get(list_games))
        .route("/api/games/:id", get(get_game))
        .route("/api/games/:id/links", get(list_links))
}
