//! Request correlation IDs.
//!
//! A client-supplied `X-Request-Id` is reused when it is a short token of
//! alphanumerics and `-_.:`; anything else is replaced by a fresh UUID v4.
//! The chosen ID becomes a [`RequestId`] extension, is echoed on the
//! response, and is recorded on the `request` span wrapping the stack.

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

const MAX_LEN: usize = 128;

/// Correlation ID of the request being served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_token(raw: &str) -> bool {
        !raw.is_empty()
            && raw.len() <= MAX_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b':'))
    }
}

/// The client's ID, if it is usable for correlation.
pub fn incoming_id(headers: &HeaderMap) -> Option<RequestId> {
    let raw = headers.get(&X_REQUEST_ID)?.to_str().ok()?.trim();
    RequestId::is_token(raw).then(|| RequestId(raw.to_string()))
}

pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let id = incoming_id(req.headers()).unwrap_or_else(RequestId::generate);
    let header = HeaderValue::from_str(id.as_str()).ok();

    if let Some(value) = &header {
        req.headers_mut().insert(X_REQUEST_ID.clone(), value.clone());
    }
    let span = tracing::info_span!(
        "request",
        request_id = %id.as_str(),
        method = %req.method(),
        path = %req.uri().path(),
    );
    req.extensions_mut().insert(id);

    let mut response = next.run(req).instrument(span).await;
    if let Some(value) = header {
        response.headers_mut().insert(X_REQUEST_ID.clone(), value);
    }
    response
}
