//! API request logging.

use std::time::Instant;

use axum::extract::{OriginalUri, Request};
use axum::middleware::Next;
use axum::response::Response;

use super::api_version::ApiVersion;
use super::trust_proxies::ClientIp;

/// Path as the client sent it. Nested routers strip their prefix from the
/// request URI, so the router-recorded [`OriginalUri`] wins when present.
pub fn logged_path(req: &Request) -> String {
    req.extensions()
        .get::<OriginalUri>()
        .map_or_else(|| req.uri().path(), |uri| uri.path())
        .to_string()
}

/// Logs method, path, version, client, status and latency of every API
/// request.
pub async fn log_requests_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = logged_path(&req);
    let client = req
        .extensions()
        .get::<ClientIp>()
        .map_or_else(|| "-".to_string(), |ip| ip.0.to_string());
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let version = response
        .extensions()
        .get::<ApiVersion>()
        .map_or("-", |v| v.0);
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    if response.status().is_server_error() {
        tracing::warn!(%method, %path, version, %client, status, elapsed_ms, "api request");
    } else {
        tracing::info!(%method, %path, version, %client, status, elapsed_ms, "api request");
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn prefers_original_uri_over_nested_path() {
        let mut req = axum::http::Request::get("/v1/user-roles")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(OriginalUri("/api/v1/user-roles?page=2".parse().unwrap()));
        assert_eq!(logged_path(&req), "/api/v1/user-roles");
    }

    #[test]
    fn falls_back_to_request_path() {
        let req = axum::http::Request::get("/api/openapi.json")
            .body(Body::empty())
            .unwrap();
        assert_eq!(logged_path(&req), "/api/openapi.json");
    }
}
