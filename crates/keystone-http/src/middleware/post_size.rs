//! Rejects requests whose declared body size exceeds the configured limit.

use axum::extract::{Request, State};
use axum::http::header::CONTENT_LENGTH;
use axum::middleware::Next;
use axum::response::Response;

use keystone_service::api::ApiException;

use crate::error::HttpFailure;
use crate::state::AppState;

pub async fn post_size_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, HttpFailure> {
    let limit = state.max_post_size();
    if limit > 0
        && let Some(len) = req
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
        && len > limit
    {
        tracing::debug!(len, limit, "request body too large");
        return Err(ApiException::PayloadTooLarge { limit_bytes: limit }.into());
    }

    Ok(next.run(req).await)
}
