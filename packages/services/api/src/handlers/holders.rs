//! Holder-level CRUD
//!
//! Mutations at this level are self-only: the authenticated principal
//! must be the holder named in the path.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use guildhall_core::auth::password;

use crate::db::HolderRow;
use crate::error::Result;
use crate::guard;
use crate::state::AppState;

/// Whole-record replace; the password only changes when supplied.
#[derive(Debug, Deserialize)]
pub struct HolderUpdate {
    pub login: String,
    pub email: String,
    pub password: Option<String>,
}

/// GET /users
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<HolderRow>>> {
    guard::current_holder(&state, &headers).await?;
    Ok(Json(state.db.list_holders().await?))
}

/// GET /user/{user_id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<HolderRow>> {
    Ok(Json(state.db.get_holder(&user_id).await?))
}

/// PUT /user/{user_id}
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<HolderUpdate>,
) -> Result<Json<HolderRow>> {
    guard::require_owner(&state, &headers, &user_id).await?;

    let hash = match &req.password {
        Some(plain) => Some(password::hash(plain)?),
        None => None,
    };
    let updated = state
        .db
        .update_holder(&user_id, &req.login, &req.email, hash.as_deref())
        .await?;
    Ok(Json(updated))
}

/// DELETE /user/{user_id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<HolderRow>> {
    guard::require_owner(&state, &headers, &user_id).await?;

    let snapshot = state.db.delete_holder(&user_id).await?;
    tracing::info!(holder = %user_id, "holder deleted");
    Ok(Json(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::Db;
    use crate::error::ApiError;
    use crate::handlers::session::{register, RegisterRequest};
    use axum::http::header;
    use chrono::Duration;
    use guildhall_core::auth::TokenService;
    use guildhall_core::Error as CoreError;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_state() -> Arc<AppState> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let db = Db::from_pool(pool);
        db.init().await.unwrap();

        Arc::new(AppState {
            config: Config {
                port: 0,
                database_url: "sqlite::memory:".to_string(),
                token_key: None,
                session_ttl_minutes: 300,
                access_ttl_minutes: 15,
            },
            db,
            tokens: TokenService::new([7u8; 32], Duration::minutes(300), Duration::minutes(15)),
        })
    }

    async fn holder_with_token(
        state: &Arc<AppState>,
        login: &str,
        email: &str,
    ) -> (String, HeaderMap) {
        let holder = register(
            State(state.clone()),
            Json(RegisterRequest {
                login: login.to_string(),
                email: email.to_string(),
                password: "secret".to_string(),
            }),
        )
        .await
        .unwrap()
        .0;

        let token = state.tokens.issue_session(email).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        (holder.id, headers)
    }

    fn assert_forbidden(err: ApiError) {
        match err {
            ApiError::Core(CoreError::Forbidden) => {}
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_is_self_only() {
        let state = test_state().await;
        let (alice_id, alice_headers) = holder_with_token(&state, "alice", "a@x.com").await;
        let (_, bob_headers) = holder_with_token(&state, "bob", "b@x.com").await;

        let err = update(
            State(state.clone()),
            Path(alice_id.clone()),
            bob_headers,
            Json(HolderUpdate {
                login: "hijacked".to_string(),
                email: "a@x.com".to_string(),
                password: None,
            }),
        )
        .await
        .unwrap_err();
        assert_forbidden(err);

        let updated = update(
            State(state.clone()),
            Path(alice_id),
            alice_headers,
            Json(HolderUpdate {
                login: "alice2".to_string(),
                email: "a@x.com".to_string(),
                password: None,
            }),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(updated.login, "alice2");
    }

    #[tokio::test]
    async fn test_delete_is_self_only() {
        let state = test_state().await;
        let (alice_id, alice_headers) = holder_with_token(&state, "alice", "a@x.com").await;
        let (_, bob_headers) = holder_with_token(&state, "bob", "b@x.com").await;

        let err = delete(State(state.clone()), Path(alice_id.clone()), bob_headers)
            .await
            .unwrap_err();
        assert_forbidden(err);
        state.db.get_holder(&alice_id).await.unwrap();

        let snapshot = delete(State(state.clone()), Path(alice_id.clone()), alice_headers)
            .await
            .unwrap()
            .0;
        assert_eq!(snapshot.id, alice_id);
        assert!(state.db.get_holder(&alice_id).await.is_err());
    }
}
