//! HTTP error plumbing.
//!
//! Handlers and middleware return [`HttpFailure`]. Its `IntoResponse` impl
//! only stashes the [`Failure`] in the response extensions; the
//! [`render_failures`](crate::middleware::render::render_failures) layer
//! then translates it with the request context it captured on the way in.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use keystone_service::Failure;
use keystone_service::api::ApiException;
use keystone_service::error::{ModelNotFound, NotFoundError, QueryError};
use keystone_service::translate::ErrorResponse;

use crate::middleware::request_id::RequestId;

/// A [`Failure`] raised inside the HTTP stack.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct HttpFailure(#[from] pub Failure);

impl From<ApiException> for HttpFailure {
    fn from(e: ApiException) -> Self {
        Self(e.into())
    }
}

impl From<QueryError> for HttpFailure {
    fn from(e: QueryError) -> Self {
        Self(e.into())
    }
}

impl From<NotFoundError> for HttpFailure {
    fn from(e: NotFoundError) -> Self {
        Self(e.into())
    }
}

impl From<ModelNotFound> for HttpFailure {
    fn from(e: ModelNotFound) -> Self {
        Self(e.into())
    }
}

impl From<JsonRejection> for HttpFailure {
    fn from(rejection: JsonRejection) -> Self {
        Self(ApiException::MalformedBody(rejection.body_text()).into())
    }
}

impl IntoResponse for HttpFailure {
    fn into_response(self) -> Response {
        let mut response = status_of(&self.0).into_response();
        response.extensions_mut().insert(self.0);
        response
    }
}

fn status_of(failure: &Failure) -> StatusCode {
    StatusCode::from_u16(failure.status_hint()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Emits a translated error: JSON body, status and headers.
pub fn json_error(body: ErrorResponse) -> Response {
    let status = StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let headers: Vec<(HeaderName, HeaderValue)> = body
        .headers
        .iter()
        .filter_map(|(name, value)| {
            Some((
                HeaderName::try_from(name.as_str()).ok()?,
                HeaderValue::try_from(value.as_str()).ok()?,
            ))
        })
        .collect();

    let mut response = (status, Json(body)).into_response();
    response.headers_mut().extend(headers);
    response
}

/// Default (non-API) rendering: a minimal HTML error page, with the
/// request ID as a support reference when one is known.
pub fn html_error(failure: &Failure, request_id: Option<&RequestId>) -> Response {
    let status = status_of(failure);
    let title = status.canonical_reason().unwrap_or("Error");
    let reference = request_id
        .map(|id| format!("<p><small>Reference: {}</small></p>", id.as_str()))
        .unwrap_or_default();
    let page = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body><main><h1>{code}</h1><p>{title}</p>{reference}</main></body>\n</html>\n",
        code = status.as_u16(),
    );
    (status, Html(page)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_response_stashes_failure() {
        let response = HttpFailure(Failure::other("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let stashed = response.extensions().get::<Failure>().unwrap();
        assert_eq!(stashed.to_string(), "boom");
    }

    #[test]
    fn json_error_copies_headers_and_status() {
        let body = ErrorResponse::new(429, "Too Many Attempts.", "TooManyRequestsException")
            .with_header("retry-after", "30");
        let response = json_error(body);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["retry-after"], "30");
    }

    #[test]
    fn html_error_uses_status_hint() {
        let response = html_error(&NotFoundError::route("/nope").into(), None);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(
            response.headers()["content-type"]
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );
    }
}
