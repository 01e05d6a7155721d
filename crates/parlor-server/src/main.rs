use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router, middleware,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use parlor_api::auth::{self, AppState, AppStateInner};
use parlor_api::emoticons;
use parlor_api::files;
use parlor_api::messages;
use parlor_api::middleware::require_auth;
use parlor_api::room_data;
use parlor_api::rooms;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parlor=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("PARLOR_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("PARLOR_DB_PATH").unwrap_or_else(|_| "parlor.db".into());
    let host = std::env::var("PARLOR_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("PARLOR_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let strict_reads = std::env::var("PARLOR_STRICT_READS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    // Init database
    let db = parlor_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let app_state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        strict_reads,
    });

    // Routes
    let public_routes = Router::new()
        .route("/status", get(status))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(app_state.clone());

    let protected_routes = Router::new()
        .route("/rooms", post(rooms::create_room))
        .route("/rooms/{room}", get(rooms::get_room))
        .route("/rooms/{room}/messages", get(messages::get_messages))
        .route("/rooms/{room}/messages", post(messages::send_message))
        .route("/rooms/{room}/emoticons", post(emoticons::add_emoticon))
        .route("/emoticons", get(emoticons::list_emoticons))
        .route("/rooms/{room}/emoticons/{emoticon_id}/send", post(emoticons::send_emoticon))
        .route("/rooms/{room}/files", post(files::upload_file))
        .route("/rooms/{room}/files/{filename}", get(files::file_history))
        .route("/rooms/{room}/files/{filename}/versions", post(files::bump_version))
        .route("/rooms/{room}/data", get(room_data::get_room_data))
        .layer(middleware::from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Parlor server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn status() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
