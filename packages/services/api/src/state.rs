//! Shared application state

use guildhall_core::auth::TokenService;

use crate::config::Config;
use crate::db::Db;

/// State shared by every handler.
///
/// Built once in `main` and injected behind an `Arc`; nothing in here
/// is mutated after startup.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub tokens: TokenService,
}
