//! Request handlers, one module per level of the hierarchy.

pub mod accounts;
pub mod characters;
pub mod holders;
pub mod inventory;
pub mod session;
