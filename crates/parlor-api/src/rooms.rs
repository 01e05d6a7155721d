use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use parlor_types::api::{Claims, CreateRoomRequest};

use crate::auth::AppState;
use crate::error::{ApiError, join_error};

pub async fn create_room(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let s = state.clone();
    let room = tokio::task::spawn_blocking(move || {
        parlor_core::rooms::create_room(&s.db, &req.name, &req.allowed_users)
    })
    .await
    .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(room)))
}

pub async fn get_room(
    State(state): State<AppState>,
    Path(room): Path<String>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let s = state.clone();
    let room = tokio::task::spawn_blocking(move || parlor_core::rooms::get_room(&s.db, &room))
        .await
        .map_err(join_error)??;

    Ok(Json(room))
}
