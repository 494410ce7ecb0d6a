//! Domain error taxonomy shared by every Guildhall component.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Guildhall domain error
///
/// Every failure a request can end in maps to exactly one of these.
/// Nothing is retried; all of them are terminal for the request.
#[derive(Debug, Error)]
pub enum Error {
    /// A path segment (or its parent) did not resolve.
    #[error("{kind} not found")]
    NotFound { kind: String },

    /// A uniqueness constraint (login, email, account name, ...) was hit.
    #[error("{field} already registered")]
    Conflict { field: String },

    /// Generic credential failure. The message never says which part of
    /// the chain failed (unknown identifier, bad password, deleted
    /// holder, bad signature) so existence cannot be probed.
    #[error("could not validate credentials")]
    Unauthorized,

    /// Authenticated, but the principal does not own the target.
    #[error("you don't have enough permissions")]
    Forbidden,

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token: {reason}")]
    InvalidToken { reason: String },

    #[error("password hash error: {message}")]
    PasswordHash { message: String },

    #[error("token error: {message}")]
    Token { message: String },
}

impl Error {
    /// HTTP status for this error.
    ///
    /// Forbidden intentionally maps to 401 with a permission message,
    /// matching the wire behavior of the service this replaces.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,

            Error::Conflict { .. } => 400,

            Error::Unauthorized
            | Error::Forbidden
            | Error::TokenExpired
            | Error::InvalidToken { .. } => 401,

            Error::PasswordHash { .. } | Error::Token { .. } => 500,
        }
    }

    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "NOT_FOUND",
            Error::Conflict { .. } => "CONFLICT",
            Error::Unauthorized => "UNAUTHORIZED",
            Error::Forbidden => "FORBIDDEN",
            Error::TokenExpired => "TOKEN_EXPIRED",
            Error::InvalidToken { .. } => "INVALID_TOKEN",
            Error::PasswordHash { .. } => "PASSWORD_HASH_ERROR",
            Error::Token { .. } => "TOKEN_ERROR",
        }
    }
}
