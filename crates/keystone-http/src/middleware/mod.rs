//! HTTP middleware, grouped the way the router applies it.
//!
//! Global stack (every route): request ID, trusted proxies, failure
//! rendering, maintenance mode, post size validation.
//! Web group: appearance.
//! API group: force JSON, request logging, string trimming, empty-string
//! conversion, plus the per-group API version marker.

pub mod api_version;
pub mod appearance;
pub mod force_json;
pub mod log_requests;
pub mod maintenance;
pub mod normalize;
pub mod post_size;
pub mod render;
pub mod request_id;
pub mod trust_proxies;
