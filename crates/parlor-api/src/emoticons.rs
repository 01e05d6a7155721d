use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use parlor_types::api::{AddEmoticonRequest, Claims};

use crate::auth::AppState;
use crate::error::{ApiError, join_error};

#[derive(Debug, Deserialize)]
pub struct EmoticonQuery {
    pub category: Option<String>,
}

pub async fn add_emoticon(
    State(state): State<AppState>,
    Path(room): Path<String>,
    Extension(_claims): Extension<Claims>,
    Json(req): Json<AddEmoticonRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let s = state.clone();
    let emoticon = tokio::task::spawn_blocking(move || {
        parlor_core::emoticons::add_emoticon(
            &s.db,
            &req.name,
            &req.url,
            req.size,
            req.animated,
            &req.category,
            &room,
        )
    })
    .await
    .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(emoticon)))
}

pub async fn list_emoticons(
    State(state): State<AppState>,
    Query(query): Query<EmoticonQuery>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let s = state.clone();
    let emoticons = tokio::task::spawn_blocking(move || {
        parlor_core::emoticons::list_emoticons(&s.db, query.category.as_deref())
    })
    .await
    .map_err(join_error)??;

    Ok(Json(emoticons))
}

pub async fn send_emoticon(
    State(state): State<AppState>,
    Path((room, emoticon_id)): Path<(String, i64)>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let s = state.clone();
    let send = tokio::task::spawn_blocking(move || {
        parlor_core::emoticons::send_emoticon(&s.db, &room, &claims.username, emoticon_id)
    })
    .await
    .map_err(join_error)??;

    Ok((StatusCode::CREATED, Json(send)))
}
