//! Authentication primitives
//!
//! # Overview
//!
//! Two independent mechanisms:
//!
//! - **Password**: Argon2id PHC hashing with a per-call random salt.
//!   Verification is the only way back in; hashes are never compared.
//! - **Bearer token**: PASETO v4.local, symmetric process-wide key.
//!   The payload carries only the subject (holder email) plus
//!   issued-at/expiry. Authorization is always re-derived from store
//!   state, never from token claims.

mod claims;
pub mod password;
mod token;

pub use claims::AccessTokenClaims;
pub use token::{bearer_token, parse_key_material, random_key, TokenService};
