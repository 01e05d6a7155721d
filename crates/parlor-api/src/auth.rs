use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{EncodingKey, Header, encode};

use parlor_db::Database;
use parlor_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use parlor_types::models::User;

use crate::error::{ApiError, invalid, join_error};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// When set, get_messages/get_room_data also enforce the allow-list
    /// instead of gating on room existence alone.
    pub strict_reads: bool,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate input
    if req.username.len() < 3 || req.username.len() > 32 {
        return Err(invalid("username must be 3-32 characters"));
    }
    if req.password.len() < 8 {
        return Err(invalid("password must be at least 8 characters"));
    }

    let s = state.clone();
    let user = tokio::task::spawn_blocking(move || {
        parlor_core::identity::register(&s.db, &req.username, &req.password)
    })
    .await
    .map_err(join_error)??;

    let token = create_token(&state.jwt_secret, user.id, &user.username)?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let s = state.clone();
    let user = tokio::task::spawn_blocking(move || authenticated_user(&s.db, &req.username, &req.password))
        .await
        .map_err(join_error)??;

    let Some(user) = user else {
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "invalid credentials" })),
        )
            .into_response());
    };

    let token = create_token(&state.jwt_secret, user.id, &user.username)?;

    Ok(Json(LoginResponse {
        user_id: user.id,
        username: user.username,
        token,
    })
    .into_response())
}

fn authenticated_user(
    db: &Database,
    username: &str,
    password: &str,
) -> Result<Option<User>, parlor_core::CoreError> {
    if !parlor_core::identity::authenticate(db, username, password)? {
        return Ok(None);
    }
    parlor_core::identity::get_user(db, username)
}

pub(crate) fn create_token(secret: &str, user_id: i64, username: &str) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        ApiError(parlor_core::CoreError::Storage(anyhow::anyhow!(
            "token encoding failed: {}",
            e
        )))
    })?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    #[test]
    fn token_round_trips_through_decode() {
        let token = create_token("test-secret", 7, "alice").unwrap();

        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret("test-secret".as_bytes()),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(data.claims.sub, 7);
        assert_eq!(data.claims.username, "alice");
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = create_token("test-secret", 7, "alice").unwrap();

        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret("other-secret".as_bytes()),
            &Validation::default(),
        );
        assert!(result.is_err());
    }
}
