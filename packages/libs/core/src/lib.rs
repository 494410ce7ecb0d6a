//! guildhall-core: shared library for the Guildhall services
//!
//! Everything the API service needs that does not touch HTTP or the
//! database lives here:
//!
//! - `auth`: password hashing, bearer token issue/validate, claims
//! - `error`: the domain error taxonomy and its HTTP mapping

pub mod auth;
pub mod error;

pub use error::{Error, Result};
