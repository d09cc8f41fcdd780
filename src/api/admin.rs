/// Admin endpoints for game and shared-account management
use crate::{
    auth::AdminAuthContext,
    db::models::{AccountKind, DownloadLink, Game, SharedAccount},
    error::VaultResult,
    games::{DownloadLinkInput, GameInput},
    lease::NewSharedAccount,
    AppContext,
};
use axum::{
    extract::{Path, State},
    routing::{delete, post, put},
    Json, Router,
};
use serde::Deserialize;

/// Shared-account creation request
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub game_id: String,
    pub kind: AccountKind,
    pub username: String,
    pub secret: String,
    pub guard_link: Option<String>,
}

/// POST /api/admin/games
pub async fn create_game(
    State(ctx): State<AppContext>,
    admin: AdminAuthContext,
    Json(input): Json<GameInput>,
) -> VaultResult<Json<Game>> {
    tracing::info!(admin = %admin.session.username, slug = %input.slug, "Admin creating game");

    Ok(Json(ctx.game_manager.create_game(input).await?))
}

/// PUT /api/admin/games/:id
pub async fn update_game(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    _admin: AdminAuthContext,
    Json(input): Json<GameInput>,
) -> VaultResult<Json<Game>> {
    Ok(Json(ctx.game_manager.update_game(&id, input).await?))
}

/// DELETE /api/admin/games/:id
pub async fn delete_game(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    admin: AdminAuthContext,
) -> VaultResult<Json<serde_json::Value>> {
    tracing::info!(admin = %admin.session.username, game_id = %id, "Admin deleting game");
    ctx.game_manager.delete_game(&id).await?;

    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// POST /api/admin/games/:id/links
pub async fn add_link(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    _admin: AdminAuthContext,
    Json(input): Json<DownloadLinkInput>,
) -> VaultResult<Json<DownloadLink>> {
    Ok(Json(ctx.game_manager.add_link(&id, input).await?))
}

/// DELETE /api/admin/links/:id
pub async fn remove_link(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    _admin: AdminAuthContext,
) -> VaultResult<Json<serde_json::Value>> {
    ctx.game_manager.remove_link(&id).await?;

    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// POST /api/admin/accounts
pub async fn create_account(
    State(ctx): State<AppContext>,
    admin: AdminAuthContext,
    Json(req): Json<CreateAccountRequest>,
) -> VaultResult<Json<SharedAccount>> {
    // Reject accounts pointing at a game that does not exist
    ctx.game_manager.get_game(&req.game_id).await?;

    tracing::info!(
        admin = %admin.session.username,
        game_id = %req.game_id,
        kind = req.kind.as_str(),
        "Admin creating shared account"
    );

    let account = ctx
        .lease_engine
        .store()
        .create(NewSharedAccount {
            game_id: req.game_id,
            kind: req.kind,
            username: req.username,
            secret: req.secret,
            guard_link: req.guard_link,
        })
        .await?;

    Ok(Json(account))
}

/// GET /api/admin/accounts
pub async fn list_accounts(
    State(ctx): State<AppContext>,
    _admin: AdminAuthContext,
) -> VaultResult<Json<Vec<SharedAccount>>> {
    Ok(Json(ctx.lease_engine.store().list_all().await?))
}

/// DELETE /api/admin/accounts/:id
///
/// Deletion is unconditional; an active lease does not protect the account.
pub async fn delete_account(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    admin: AdminAuthContext,
) -> VaultResult<Json<serde_json::Value>> {
    tracing::info!(admin = %admin.session.username, account_id = %id, "Admin deleting shared account");
    ctx.lease_engine.store().delete(&id).await?;

    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// Build admin routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/admin/games", post(create_game))
        .route("/api/admin/games/:id", put(update_game).delete(delete_game))
        .route("/api/admin/games/:id/links", post(add_link))
        .route("/api/admin/links/:id", delete(remove_link))
        .route("/api/admin/accounts", post(create_account).get(list_accounts))
        .route("/api/admin/accounts/:id", delete(delete_account))
}
