use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use parlor_types::api::Claims;

use crate::auth::AppState;
use crate::error::{ApiError, join_error};

/// GET /rooms/{room}/data — the room's merged chronological timeline.
pub async fn get_room_data(
    State(state): State<AppState>,
    Path(room): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let s = state.clone();
    let entries = tokio::task::spawn_blocking(move || {
        parlor_core::timeline::get_room_data(&s.db, &room, &claims.username, s.strict_reads)
    })
    .await
    .map_err(join_error)??;

    Ok(Json(entries))
}
