//! Makes every API request ask for JSON.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::http::header::ACCEPT;
use axum::middleware::Next;
use axum::response::Response;

pub async fn force_json_middleware(mut req: Request, next: Next) -> Response {
    req.headers_mut()
        .insert(ACCEPT, HeaderValue::from_static("application/json"));
    next.run(req).await
}
