//! Guildhall API entry point
//!
//! Builds the process-wide immutables (config, database pool, token
//! service), registers the routes and serves.

mod config;
mod db;
mod error;
mod guard;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Duration;
use serde_json::Value;

use guildhall_core::auth::{parse_key_material, random_key, TokenService};

use crate::config::Config;
use crate::db::Db;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env()?;

    let key = match config.token_key.as_deref().and_then(parse_key_material) {
        Some(key) => key,
        None => {
            tracing::warn!(
                "GUILDHALL_TOKEN_KEY missing or unparseable; using an ephemeral key, \
                 issued tokens will not survive a restart"
            );
            random_key()?
        }
    };
    let tokens = TokenService::new(
        key,
        Duration::minutes(config.session_ttl_minutes),
        Duration::minutes(config.access_ttl_minutes),
    );

    let db = Db::connect(&config.database_url).await?;
    db.init().await?;

    let port = config.port;
    let state = Arc::new(AppState { config, db, tokens });

    let app = Router::new()
        .route("/health", get(health))
        .route("/token", post(handlers::session::login))
        .route("/user", post(handlers::session::register))
        .route("/users", get(handlers::holders::list))
        .route("/user/me", get(handlers::session::me))
        .route(
            "/user/{user_id}",
            get(handlers::holders::get)
                .put(handlers::holders::update)
                .delete(handlers::holders::delete),
        )
        .route("/user/{user_id}/comptes", get(handlers::accounts::list))
        .route("/user/{user_id}/compte", post(handlers::accounts::create))
        .route(
            "/user/{user_id}/compte/{compte_id}",
            get(handlers::accounts::get)
                .put(handlers::accounts::update)
                .delete(handlers::accounts::delete),
        )
        .route(
            "/user/{user_id}/compte/{compte_id}/personnages",
            get(handlers::characters::list),
        )
        .route(
            "/user/{user_id}/compte/{compte_id}/personnage",
            post(handlers::characters::create),
        )
        .route(
            "/user/{user_id}/compte/{compte_id}/personnage/{personnage_id}",
            get(handlers::characters::get)
                .put(handlers::characters::update)
                .delete(handlers::characters::delete),
        )
        .route(
            "/user/{user_id}/compte/{compte_id}/personnage/{personnage_id}/inventaire",
            get(handlers::inventory::get)
                .post(handlers::inventory::create)
                .put(handlers::inventory::update)
                .delete(handlers::inventory::delete),
        )
        .layer(axum::middleware::from_fn(middleware::request_id))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("guildhall-api listening on port {}", port);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({"ok": true}))
}
