//! Account ("compte") CRUD under a holder
//!
//! Reads are open but chain-resolved; mutations require the
//! authenticated principal to own the holder segment of the path.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::db::AccountRow;
use crate::error::Result;
use crate::guard;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AccountPayload {
    pub name: String,
}

/// GET /user/{user_id}/comptes
pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<AccountRow>>> {
    Ok(Json(state.db.list_accounts(&user_id).await?))
}

/// POST /user/{user_id}/compte
pub async fn create(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<AccountPayload>,
) -> Result<Json<AccountRow>> {
    guard::require_owner(&state, &headers, &user_id).await?;
    Ok(Json(state.db.create_account(&user_id, &req.name).await?))
}

/// GET /user/{user_id}/compte/{compte_id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path((user_id, compte_id)): Path<(String, String)>,
) -> Result<Json<AccountRow>> {
    Ok(Json(state.db.get_account(&user_id, &compte_id).await?))
}

/// PUT /user/{user_id}/compte/{compte_id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path((user_id, compte_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(req): Json<AccountPayload>,
) -> Result<Json<AccountRow>> {
    guard::require_owner(&state, &headers, &user_id).await?;
    Ok(Json(
        state
            .db
            .rename_account(&user_id, &compte_id, &req.name)
            .await?,
    ))
}

/// DELETE /user/{user_id}/compte/{compte_id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path((user_id, compte_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<AccountRow>> {
    guard::require_owner(&state, &headers, &user_id).await?;
    Ok(Json(state.db.delete_account(&user_id, &compte_id).await?))
}
