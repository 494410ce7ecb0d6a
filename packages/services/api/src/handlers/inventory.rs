//! Inventory ("inventaire") endpoints, 1:1 with a character
//!
//! POST replaces any existing record with a fresh id; PUT mutates the
//! existing record in place and keeps its id.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::db::InventoryRow;
use crate::error::Result;
use crate::guard;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InventoryPayload {
    pub item: String,
}

/// GET /user/{user_id}/compte/{compte_id}/personnage/{personnage_id}/inventaire
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path((user_id, compte_id, personnage_id)): Path<(String, String, String)>,
) -> Result<Json<InventoryRow>> {
    Ok(Json(
        state
            .db
            .get_inventory(&user_id, &compte_id, &personnage_id)
            .await?,
    ))
}

/// POST /user/{user_id}/compte/{compte_id}/personnage/{personnage_id}/inventaire
pub async fn create(
    State(state): State<Arc<AppState>>,
    Path((user_id, compte_id, personnage_id)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(req): Json<InventoryPayload>,
) -> Result<Json<InventoryRow>> {
    guard::require_owner(&state, &headers, &user_id).await?;
    Ok(Json(
        state
            .db
            .replace_inventory(&user_id, &compte_id, &personnage_id, &req.item)
            .await?,
    ))
}

/// PUT /user/{user_id}/compte/{compte_id}/personnage/{personnage_id}/inventaire
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path((user_id, compte_id, personnage_id)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(req): Json<InventoryPayload>,
) -> Result<Json<InventoryRow>> {
    guard::require_owner(&state, &headers, &user_id).await?;
    Ok(Json(
        state
            .db
            .update_inventory(&user_id, &compte_id, &personnage_id, &req.item)
            .await?,
    ))
}

/// DELETE /user/{user_id}/compte/{compte_id}/personnage/{personnage_id}/inventaire
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path((user_id, compte_id, personnage_id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<Json<InventoryRow>> {
    guard::require_owner(&state, &headers, &user_id).await?;
    Ok(Json(
        state
            .db
            .delete_inventory(&user_id, &compte_id, &personnage_id)
            .await?,
    ))
}
