//! Character ("personnage") CRUD under an account

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::db::CharacterRow;
use crate::error::Result;
use crate::guard;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CharacterPayload {
    pub name: String,
}

/// GET /user/{user_id}/compte/{compte_id}/personnages
pub async fn list(
    State(state): State<Arc<AppState>>,
    Path((user_id, compte_id)): Path<(String, String)>,
) -> Result<Json<Vec<CharacterRow>>> {
    Ok(Json(state.db.list_characters(&user_id, &compte_id).await?))
}

/// POST /user/{user_id}/compte/{compte_id}/personnage
pub async fn create(
    State(state): State<Arc<AppState>>,
    Path((user_id, compte_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(req): Json<CharacterPayload>,
) -> Result<Json<CharacterRow>> {
    guard::require_owner(&state, &headers, &user_id).await?;
    Ok(Json(
        state
            .db
            .create_character(&user_id, &compte_id, &req.name)
            .await?,
    ))
}

/// GET /user/{user_id}/compte/{compte_id}/personnage/{personnage_id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path((user_id, compte_id, personnage_id)): Path<(String, String, String)>,
) -> Result<Json<CharacterRow>> {
    Ok(Json(
        state
            .db
            .get_character(&user_id, &compte_id, &personnage_id)
            .await?,
    ))
}

/// PUT /user/{user_id}/compte/{compte_id}/personnage/{personnage_id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path((user_id, compte_id, personnage_id)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(req): Json<CharacterPayload>,
) -> Result<Json<CharacterRow>> {
    guard::require_owner(&state, &headers, &user_id).await?;
    Ok(Json(
        state
            .db
            .rename_character(&user_id, &compte_id, &personnage_id, &req.name)
            .await?,
    ))
}

/// DELETE /user/{user_id}/compte/{compte_id}/personnage/{personnage_id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path((user_id, compte_id, personnage_id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<Json<CharacterRow>> {
    guard::require_owner(&state, &headers, &user_id).await?;
    Ok(Json(
        state
            .db
            .delete_character(&user_id, &compte_id, &personnage_id)
            .await?,
    ))
}
