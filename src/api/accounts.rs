/// Shared-account leasing endpoints
use crate::{
    auth::AuthContext,
    db::models::AccountKind,
    error::VaultResult,
    lease::{AccountStatus, LeasedAccount},
    AppContext,
};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

/// Assign request body
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub hours: i64,
}

/// Account view with the credential payload redacted unless the caller
/// may actually use it (offline account, or the caller holds the lease)
#[derive(Debug, Serialize)]
pub struct AccountView {
    pub id: String,
    pub game_id: String,
    pub kind: AccountKind,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guard_link: Option<String>,
    pub lease_holder: Option<String>,
    pub lease_expires_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl AccountView {
    fn for_requester(account: LeasedAccount, requester_id: &str) -> Self {
        let now = chrono::Utc::now();
        let holds_lease = account.lease_holder.as_deref() == Some(requester_id)
            && account.lease_expires_at.is_some_and(|e| e > now);
        let may_use = account.kind == AccountKind::Offline || holds_lease;

        Self {
            id: account.id,
            game_id: account.game_id,
            kind: account.kind,
            username: account.username,
            secret: may_use.then_some(account.secret),
            guard_link: if may_use { account.guard_link } else { None },
            lease_holder: account.lease_holder,
            lease_expires_at: account.lease_expires_at,
        }
    }
}

/// POST /api/accounts/:id/assign
pub async fn assign_account(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    auth: AuthContext,
    Json(req): Json<AssignRequest>,
) -> VaultResult<Json<AccountView>> {
    let account = ctx.lease_engine.assign(&id, &auth.user_id, req.hours).await?;

    Ok(Json(AccountView::for_requester(account, &auth.user_id)))
}

/// POST /api/accounts/:id/release
pub async fn release_account(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    auth: AuthContext,
) -> VaultResult<Json<AccountView>> {
    let account = ctx.lease_engine.release(&id, &auth.user_id).await?;

    Ok(Json(AccountView::for_requester(account, &auth.user_id)))
}

/// GET /api/accounts/:id
pub async fn get_account(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    auth: AuthContext,
) -> VaultResult<Json<AccountView>> {
    let account: LeasedAccount = ctx.lease_engine.store().get(&id).await?.into();

    Ok(Json(AccountView::for_requester(account, &auth.user_id)))
}

/// GET /api/accounts/:id/status
pub async fn account_status(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> VaultResult<Json<AccountStatus>> {
    Ok(Json(ctx.lease_engine.status(&id).await?))
}

/// GET /api/games/:id/accounts
pub async fn game_account_statuses(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> VaultResult<Json<Vec<AccountStatus>>> {
    Ok(Json(ctx.lease_engine.list_statuses_for_game(&id).await?))
}

/// Build leasing API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/accounts/:id/assign", post(assign_account))
        .route("/api/accounts/:id/release", post(release_account))
        .route("/api/accounts/:id", get(get_account))
        .route("/api/accounts/:id/status", get(account_status))
        .route("/api/games/:id/accounts", get(game_account_statuses))
}
