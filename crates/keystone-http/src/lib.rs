//! Keystone HTTP: REST API transport adapter for Keystone Server.
//!
//! Provides the HTTP interface including:
//! - Versioned user role endpoints (`/api/v1/user-roles`)
//! - Health (`/up`) and web landing page (`/`)
//! - Failure → JSON translation for API requests, HTML pages otherwise
//! - The global, web and API middleware groups
//! - OpenAPI document (`/api/openapi.json`)

pub mod context;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use keystone_service::resource::{UserRoleCollection, UserRoleItem, UserRoleResource};
use keystone_service::translate::ErrorResponse;

use middleware::api_version::{ApiVersion, api_version_middleware};

pub use state::{AppState, HttpConfig, Maintenance, TrustedProxies};

// ---------------------------------------------------------------------------
// OpenAPI
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Keystone API",
        description = "User role management API.\n\nAPI failures are returned as JSON objects with `message`, `error` and `debug` keys; the HTTP status travels in the response envelope.",
        version = "1.0.0",
        license(name = "Apache-2.0"),
    ),
    paths(
        routes::system::up,
        routes::roles::index,
        routes::roles::store,
        routes::roles::show,
        routes::roles::destroy,
    ),
    components(
        schemas(
            ErrorResponse, UserRoleResource, UserRoleItem, UserRoleCollection,
            routes::roles::CreateUserRole,
        )
    ),
    tags(
        (name = "User Roles", description = "User role management"),
        (name = "System", description = "System and health endpoints"),
    )
)]
struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Builds the HTTP router.
///
/// `.layer()` wraps everything added before it, so each group below lists
/// its middleware innermost first.
pub fn router(state: AppState) -> Router {
    let v1 = Router::new()
        .route(
            "/user-roles",
            get(routes::roles::index).post(routes::roles::store),
        )
        .route(
            "/user-roles/{id}",
            get(routes::roles::show).delete(routes::roles::destroy),
        )
        .method_not_allowed_fallback(routes::system::method_not_allowed)
        .layer(from_fn_with_state(ApiVersion("v1"), api_version_middleware));

    // API group
    let api = Router::new()
        .nest("/v1", v1)
        .route("/openapi.json", get(openapi_json))
        .method_not_allowed_fallback(routes::system::method_not_allowed)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::normalize::convert_empty_strings_middleware,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::normalize::trim_strings_middleware,
        ))
        .layer(from_fn(middleware::log_requests::log_requests_middleware))
        .layer(from_fn(middleware::force_json::force_json_middleware));

    // Web group
    let web = Router::new()
        .route("/", get(routes::system::welcome))
        .layer(from_fn(middleware::appearance::appearance_middleware));

    // Global stack
    Router::new()
        .route("/up", get(routes::system::up))
        .merge(web)
        .nest("/api", api)
        .fallback(routes::system::fallback)
        .method_not_allowed_fallback(routes::system::method_not_allowed)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(
            state.clone(),
            middleware::post_size::post_size_middleware,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::maintenance::maintenance_middleware,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::render::render_failures,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::trust_proxies::trust_proxies_middleware,
        ))
        .layer(from_fn(middleware::request_id::request_id_middleware))
        .layer(cors_layer(&state))
        .with_state(state)
}

/// Serve the HTTP router on the given listener with graceful shutdown.
///
/// Wraps `axum::serve` with `ConnectInfo<SocketAddr>` so proxy resolution
/// and logging can see client addresses.
pub async fn serve(
    listener: tokio::net::TcpListener,
    app: Router,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let origins = state.cors_origins();

    // No origins configured → no CORS headers (deny cross-origin by default).
    if origins.is_empty() {
        return CorsLayer::new();
    }

    let x_request_id = axum::http::header::HeaderName::from_static("x-request-id");
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::header::AUTHORIZATION,
            axum::http::header::HeaderName::from_static("x-requested-with"),
            x_request_id.clone(),
        ])
        .expose_headers([
            x_request_id,
            axum::http::header::HeaderName::from_static("x-api-version"),
        ]);

    if origins.len() == 1 && origins[0] == "*" {
        tracing::warn!("CORS configured with wildcard origin, all cross-origin requests allowed");
        base.allow_origin(tower_http::cors::Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        base.allow_origin(parsed)
    }
}
