//! Login, registration and "who am I"
//!
//! The session surface composes the credential hasher, the token
//! service and the holder store. Login failures are uniform: the
//! response never distinguishes an unknown identifier from a wrong
//! password, and the unknown-identifier path still pays for one
//! verification against a dummy hash.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use guildhall_core::auth::password;
use guildhall_core::Error as CoreError;

use crate::db::HolderRow;
use crate::error::Result;
use crate::guard;
use crate::state::AppState;

/// OAuth2 password-grant form shape: `username` is the login OR email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub login: String,
    pub email: String,
    pub password: String,
}

/// POST /token
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>> {
    let holder = state.db.find_holder_by_identifier(&form.username).await?;

    let verified = match &holder {
        Some(h) => password::verify(&form.password, &h.password_hash),
        None => {
            // keep the timing profile of the wrong-password path
            password::verify(&form.password, password::DUMMY_HASH);
            false
        }
    };

    let Some(holder) = holder.filter(|_| verified) else {
        return Err(CoreError::Unauthorized.into());
    };

    state.db.touch_last_login(&holder.id).await?;
    let access_token = state.tokens.issue_session(&holder.email)?;
    tracing::info!(holder = %holder.id, "login");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

/// POST /user
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<HolderRow>> {
    let hash = password::hash(&req.password)?;
    let holder = state.db.create_holder(&req.login, &req.email, &hash).await?;
    tracing::info!(holder = %holder.id, "registered");
    Ok(Json(holder))
}

/// GET /user/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<HolderRow>> {
    let holder = guard::current_holder(&state, &headers).await?;
    Ok(Json(holder))
}
