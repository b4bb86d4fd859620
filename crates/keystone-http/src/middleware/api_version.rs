//! `api.version` middleware: tags requests with the API version of the
//! route group that serves them.

use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

static X_API_VERSION: HeaderName = HeaderName::from_static("x-api-version");

/// API versions mounted under `/api/{version}`.
pub const SUPPORTED_VERSIONS: &[&str] = &["v1"];

/// Version of the route group serving a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersion(pub &'static str);

/// Returns the `{version}` segment of an `/api/{version}/...` path when it
/// looks like a version tag (`v` followed by digits).
pub fn requested_version(path: &str) -> Option<&str> {
    let rest = path.trim_start_matches('/').strip_prefix("api/")?;
    let segment = rest.split('/').next()?;
    let digits = segment.strip_prefix('v')?;
    (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).then_some(segment)
}

pub fn is_supported(version: &str) -> bool {
    SUPPORTED_VERSIONS.contains(&version)
}

/// Tags the response with the serving [`ApiVersion`]: an `X-Api-Version`
/// header for clients and a response extension for the request log.
pub async fn api_version_middleware(
    State(version): State<ApiVersion>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(X_API_VERSION.clone(), HeaderValue::from_static(version.0));
    response.extensions_mut().insert(version);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_version_segment() {
        assert_eq!(requested_version("/api/v1/user-roles"), Some("v1"));
        assert_eq!(requested_version("/api/v12"), Some("v12"));
        assert_eq!(requested_version("/api/users"), None);
        assert_eq!(requested_version("/api/v/x"), None);
        assert_eq!(requested_version("/web/v1"), None);
    }

    #[tokio::test]
    async fn tags_response_with_version() {
        use axum::Router;
        use axum::body::Body;
        use axum::middleware::from_fn_with_state;
        use axum::routing::get;
        use tower::ServiceExt;

        let app = Router::new()
            .route("/roles", get(|| async { "ok" }))
            .layer(from_fn_with_state(ApiVersion("v1"), api_version_middleware));
        let response = app
            .oneshot(axum::http::Request::get("/roles").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.headers()["x-api-version"], "v1");
        assert_eq!(
            response.extensions().get::<ApiVersion>(),
            Some(&ApiVersion("v1"))
        );
    }

    #[test]
    fn only_v1_is_supported() {
        assert!(is_supported("v1"));
        assert!(!is_supported("v2"));
    }
}
