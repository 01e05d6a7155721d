use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use parlor_types::api::{Claims, SendMessageRequest};

use crate::auth::AppState;
use crate::error::{ApiError, join_error};

pub async fn send_message(
    State(state): State<AppState>,
    Path(room): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let s = state.clone();
    let message = tokio::task::spawn_blocking(move || {
        parlor_core::messages::post_message(&s.db, &room, &claims.username, &req.text)
    })
    .await
    .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn get_messages(
    State(state): State<AppState>,
    Path(room): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let s = state.clone();
    let messages = tokio::task::spawn_blocking(move || {
        parlor_core::messages::get_messages(&s.db, &room, &claims.username, s.strict_reads)
    })
    .await
    .map_err(join_error)??;

    Ok(Json(messages))
}
