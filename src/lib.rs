//! Keystone Server - user role API with JSON failure translation.
//!
//! The binary wires configuration and logging around the `keystone-http`
//! router; all request handling lives in the workspace crates:
//! - `keystone-service`: failure taxonomy, translator, report throttle, roles
//! - `keystone-http`: axum router, middleware groups, failure rendering

pub mod config;
