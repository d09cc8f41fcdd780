/// Save-file upload and download endpoints
use crate::{
    auth::AuthContext,
    db::models::SaveFile,
    error::VaultResult,
    saves::UploadSaveParams,
    AppContext,
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// POST /api/games/:id/saves
pub async fn upload_save(
    State(ctx): State<AppContext>,
    Path(game_id): Path<String>,
    auth: AuthContext,
    Query(params): Query<UploadSaveParams>,
    body: Bytes,
) -> VaultResult<Json<SaveFile>> {
    // 404 before touching storage if the game does not exist
    ctx.game_manager.get_game(&game_id).await?;

    let save = ctx
        .save_manager
        .upload(&game_id, &auth.user_id, &params.file_name, params.note, &body)
        .await?;

    Ok(Json(save))
}

/// GET /api/games/:id/saves
pub async fn list_saves(
    State(ctx): State<AppContext>,
    Path(game_id): Path<String>,
    _auth: AuthContext,
) -> VaultResult<Json<Vec<SaveFile>>> {
    Ok(Json(ctx.save_manager.list_by_game(&game_id).await?))
}

/// GET /api/saves/:id
pub async fn get_save(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    _auth: AuthContext,
) -> VaultResult<Json<SaveFile>> {
    Ok(Json(ctx.save_manager.get(&id).await?))
}

/// GET /api/saves/:id/download
pub async fn download_save(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    _auth: AuthContext,
) -> VaultResult<Response> {
    let (save, data) = ctx.save_manager.download(&id).await?;

    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", save.file_name),
        ),
    ];

    Ok((headers, data).into_response())
}

/// DELETE /api/saves/:id
pub async fn delete_save(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    auth: AuthContext,
) -> VaultResult<Json<serde_json::Value>> {
    ctx.save_manager.delete(&id, &auth.user_id).await?;

    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// Build save-file routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/games/:id/saves", post(upload_save).get(list_saves))
        .route("/api/saves/:id", get(get_save).delete(delete_save))
        .route("/api/saves/:id/download", get(download_save))
}
