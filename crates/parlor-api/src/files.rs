use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use parlor_types::api::{BumpVersionRequest, Claims, UploadFileRequest};

use crate::auth::AppState;
use crate::error::{ApiError, join_error};

/// POST /rooms/{room}/files — version 1 of a fresh file, uploader taken
/// from the authenticated caller.
pub async fn upload_file(
    State(state): State<AppState>,
    Path(room): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UploadFileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let s = state.clone();
    let file = tokio::task::spawn_blocking(move || {
        parlor_core::files::upload_file(&s.db, &req.filename, &req.url, &claims.username, &room)
    })
    .await
    .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(file)))
}

/// POST /rooms/{room}/files/{filename}/versions — append the next
/// version; 404 when the file was never uploaded to this room.
pub async fn bump_version(
    State(state): State<AppState>,
    Path((room, filename)): Path<(String, String)>,
    Extension(_claims): Extension<Claims>,
    Json(req): Json<BumpVersionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let s = state.clone();
    let file = tokio::task::spawn_blocking(move || {
        parlor_core::files::bump_version(&s.db, &filename, &req.url, &req.edited_by, &room)
    })
    .await
    .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(file)))
}

/// GET /rooms/{room}/files/{filename} — the full version ledger.
pub async fn file_history(
    State(state): State<AppState>,
    Path((room, filename)): Path<(String, String)>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let s = state.clone();
    let history = tokio::task::spawn_blocking(move || {
        parlor_core::files::file_history(&s.db, &room, &filename)
    })
    .await
    .map_err(join_error)??;

    Ok(Json(history))
}
