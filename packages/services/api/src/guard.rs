//! Authorization guard
//!
//! A request is either unauthenticated or carries a token that
//! resolves to a live holder row. Every failure along that chain
//! (missing header, malformed token, bad key, expiry, holder deleted
//! after issuance) collapses into the one generic `Unauthorized`, so a
//! caller can never probe which step broke.

use axum::http::{header, HeaderMap};

use guildhall_core::auth::bearer_token;
use guildhall_core::Error as CoreError;

use crate::db::HolderRow;
use crate::error::Result;
use crate::state::AppState;

/// Resolve the current principal from the `Authorization` header.
pub async fn current_holder(state: &AppState, headers: &HeaderMap) -> Result<HolderRow> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .ok_or(CoreError::Unauthorized)?;

    let claims = state
        .tokens
        .validate(token)
        .map_err(|_| CoreError::Unauthorized)?;

    state
        .db
        .find_holder_by_email(&claims.sub)
        .await?
        .ok_or_else(|| CoreError::Unauthorized.into())
}

/// Authenticate, then require the principal to be the holder the path
/// names. The target segment must resolve (404) before ownership is
/// judged (permission failure).
pub async fn require_owner(
    state: &AppState,
    headers: &HeaderMap,
    user_id: &str,
) -> Result<HolderRow> {
    let principal = current_holder(state, headers).await?;
    let target = state.db.get_holder(user_id).await?;
    if principal.id != target.id {
        return Err(CoreError::Forbidden.into());
    }
    Ok(principal)
}
