//! Failure rendering: turns stashed failures into wire responses.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use keystone_service::Failure;
use keystone_service::translate::Rendered;

use crate::context::request_context;
use crate::error::{html_error, json_error};
use crate::middleware::request_id::RequestId;
use crate::state::AppState;

/// Captures the request context, runs the inner stack, and if the response
/// carries a [`Failure`] reports it and renders it: JSON for API requests,
/// the default HTML error page otherwise.
pub async fn render_failures(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let ctx = request_context(&req);
    let request_id = req.extensions().get::<RequestId>().cloned();
    let mut response = next.run(req).await;

    let Some(failure) = response.extensions_mut().remove::<Failure>() else {
        return response;
    };

    if failure.status_hint() >= 500 {
        tracing::error!(kind = failure.kind_name(), error = %failure, "request failed");
    } else {
        tracing::debug!(kind = failure.kind_name(), error = %failure, "request rejected");
    }
    state.reporter().report(&failure, Some(ctx.path()));

    match state.translator().render(&ctx, &failure) {
        Rendered::Json(body) => json_error(body),
        Rendered::Defer => html_error(&failure, request_id.as_ref()),
    }
}
