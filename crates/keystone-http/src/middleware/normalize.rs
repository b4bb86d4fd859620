//! JSON input normalisation for API requests: trims strings and turns
//! empty strings into null.
//!
//! Only `application/json` bodies are rewritten. Bodies that fail to parse
//! pass through untouched so the handler can reject them.

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::middleware::Next;
use axum::response::Response;
use futures_util::StreamExt;
use serde_json::Value;

use keystone_service::api::ApiException;

use crate::error::HttpFailure;
use crate::state::AppState;

/// Keys whose values are never trimmed.
const TRIM_EXCEPT: &[&str] = &["password", "password_confirmation", "current_password"];

pub async fn trim_strings_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, HttpFailure> {
    let req = rewrite_json(req, state.max_post_size(), trim_strings).await?;
    Ok(next.run(req).await)
}

pub async fn convert_empty_strings_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, HttpFailure> {
    let req = rewrite_json(req, state.max_post_size(), convert_empty_strings).await?;
    Ok(next.run(req).await)
}

/// Trims every string value, skipping the keys in [`TRIM_EXCEPT`].
pub fn trim_strings(value: &mut Value) {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.len() != s.len() {
                *s = trimmed.to_string();
            }
        }
        Value::Array(items) => items.iter_mut().for_each(trim_strings),
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if !TRIM_EXCEPT.contains(&key.as_str()) {
                    trim_strings(v);
                }
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Replaces every `""` with `null`.
pub fn convert_empty_strings(value: &mut Value) {
    if value.as_str() == Some("") {
        *value = Value::Null;
        return;
    }
    match value {
        Value::Array(items) => items.iter_mut().for_each(convert_empty_strings),
        Value::Object(map) => map.values_mut().for_each(convert_empty_strings),
        _ => {}
    }
}

fn is_json(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| {
            let mime = mime.trim();
            mime == "application/json" || mime.ends_with("+json")
        })
}

async fn rewrite_json(
    req: Request,
    limit: u64,
    rewrite: fn(&mut Value),
) -> Result<Request, HttpFailure> {
    if !is_json(&req) {
        return Ok(req);
    }

    let (mut parts, body) = req.into_parts();
    let bytes = read_limited(body, limit).await?;

    let bytes = match serde_json::from_slice::<Value>(&bytes) {
        Ok(mut value) => {
            rewrite(&mut value);
            // Serializing a `Value` cannot fail.
            Bytes::from(serde_json::to_vec(&value).unwrap_or_else(|_| bytes.to_vec()))
        }
        Err(_) => bytes,
    };

    parts.headers.remove(CONTENT_LENGTH);
    Ok(Request::from_parts(parts, Body::from(bytes)))
}

/// Collects `body`, failing with `PayloadTooLarge` once it grows past
/// `limit` bytes (0 = unlimited). Covers bodies sent without a
/// `Content-Length`, which the post size check cannot see.
async fn read_limited(body: Body, limit: u64) -> Result<Bytes, HttpFailure> {
    let max = if limit == 0 {
        usize::MAX
    } else {
        usize::try_from(limit).unwrap_or(usize::MAX)
    };
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ApiException::MalformedBody(e.to_string()))?;
        if buf.len().saturating_add(chunk.len()) > max {
            tracing::debug!(limit, "streamed request body too large");
            return Err(ApiException::PayloadTooLarge { limit_bytes: limit }.into());
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buf))
}
