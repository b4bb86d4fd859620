//! Maintenance mode: rejects requests with 503 while enabled.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use keystone_service::api::ApiException;

use crate::error::HttpFailure;
use crate::state::AppState;

/// Paths that stay reachable during maintenance.
const EXEMPT_PATHS: &[&str] = &["/up"];

pub async fn maintenance_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, HttpFailure> {
    if let Some(maintenance) = state.maintenance()
        && !EXEMPT_PATHS.contains(&req.uri().path())
    {
        return Err(ApiException::ServiceUnavailable {
            retry_after_secs: maintenance.retry_after_secs,
        }
        .into());
    }

    Ok(next.run(req).await)
}
