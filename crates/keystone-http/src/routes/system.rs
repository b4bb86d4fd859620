//! Health, welcome and fallback endpoints.

use axum::Extension;
use axum::extract::OriginalUri;
use axum::http::Method;
use axum::response::Html;

use keystone_service::Failure;
use keystone_service::api::ApiException;
use keystone_service::error::NotFoundError;

use crate::error::HttpFailure;
use crate::middleware::api_version::{is_supported, requested_version};
use crate::middleware::appearance::Appearance;

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/up",
    responses(
        (status = 200, description = "Application is up"),
    ),
    tag = "System"
)]
pub async fn up() -> Html<&'static str> {
    Html(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Keystone</title></head>\n\
         <body><main><h1>Application up</h1></main></body>\n</html>\n",
    )
}

/// Web landing page, rendered in the visitor's preferred colour scheme.
pub async fn welcome(Extension(appearance): Extension<Appearance>) -> Html<String> {
    let scheme = appearance.as_str();
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\" class=\"{scheme}\">\n\
         <head><meta charset=\"utf-8\"><meta name=\"color-scheme\" content=\"{scheme}\"><title>Keystone</title></head>\n\
         <body><main><h1>Keystone</h1><p>API available under <code>/api/v1</code>.</p></main></body>\n</html>\n"
    ))
}

/// Unmatched routes. `/api/{version}/...` with an unknown version tag is
/// reported as such; everything else is a plain not-found.
pub async fn fallback(OriginalUri(uri): OriginalUri) -> HttpFailure {
    let path = uri.path();
    if let Some(version) = requested_version(path)
        && !is_supported(version)
    {
        return ApiException::UnsupportedVersion {
            requested: version.to_string(),
        }
        .into();
    }
    NotFoundError::route(path).into()
}

/// Known route, unsupported method. Rendered through the catch-all branch,
/// so API clients get a 500 whose `error` label names the method and route.
pub async fn method_not_allowed(method: Method, OriginalUri(uri): OriginalUri) -> HttpFailure {
    Failure::other(format!(
        "The {method} method is not supported for route {}.",
        uri.path().trim_start_matches('/')
    ))
    .into()
}
