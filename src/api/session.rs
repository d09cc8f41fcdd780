/// User registration and session endpoints
use crate::{
    auth::AuthContext,
    error::VaultResult,
    users::{CreateSessionRequest, RegisterRequest, SessionResponse},
    AppContext,
};
use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use serde::Serialize;

/// GET /api/session response
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub user_id: String,
    pub username: String,
    pub is_admin: bool,
}

/// POST /api/users - register and log straight in
pub async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> VaultResult<Json<SessionResponse>> {
    let user = ctx.user_manager.register(&req.username, &req.password).await?;
    let session = ctx.user_manager.create_session(&user.id).await?;

    Ok(Json(SessionResponse {
        user_id: user.id,
        username: user.username,
        access_token: session.access_token,
        is_admin: user.is_admin,
    }))
}

/// POST /api/session - login
pub async fn create_session(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateSessionRequest>,
) -> VaultResult<Json<SessionResponse>> {
    let (user, session) = ctx.user_manager.login(&req.username, &req.password).await?;

    Ok(Json(SessionResponse {
        user_id: user.id,
        username: user.username,
        access_token: session.access_token,
        is_admin: user.is_admin,
    }))
}

/// GET /api/session - current session info
pub async fn get_session(auth: AuthContext) -> Json<SessionInfo> {
    Json(SessionInfo {
        user_id: auth.session.user_id,
        username: auth.session.username,
        is_admin: auth.session.is_admin,
    })
}

/// DELETE /api/session - logout
pub async fn delete_session(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> VaultResult<Json<serde_json::Value>> {
    ctx.user_manager.delete_session(&auth.session.session_id).await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Build session routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/users", post(register))
        .route(
            "/api/session",
            post(create_session).get(get_session).delete(delete_session),
        )
}
