//! Access token claims
//!
//! Payload of the PASETO v4.local bearer token. Identity only: no
//! roles, no permissions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Bearer token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (holder email)
    pub sub: String,

    /// Issued at
    pub iat: DateTime<Utc>,

    /// Expires at
    pub exp: DateTime<Utc>,
}

impl AccessTokenClaims {
    pub fn new(sub: String, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub,
            iat: now,
            exp: now + lifetime,
        }
    }

    /// A token is valid strictly before `exp` and invalid at or after it.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.exp
    }
}
