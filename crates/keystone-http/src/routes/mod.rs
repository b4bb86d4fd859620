//! HTTP route handlers.

pub mod roles;
pub mod system;
