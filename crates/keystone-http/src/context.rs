//! Builds a [`RequestContext`] from an HTTP request.

use axum::extract::Request;
use axum::http::HeaderMap;
use axum::http::header::ACCEPT;

use keystone_service::RequestContext;

/// Captures the path and JSON expectation of `req`.
pub fn request_context(req: &Request) -> RequestContext {
    RequestContext::new(req.uri().path(), expects_json(req.headers()))
}

/// True for ajax requests that accept anything, or when the client wants JSON.
pub fn expects_json(headers: &HeaderMap) -> bool {
    (is_ajax(headers) && !is_pjax(headers) && accepts_any(headers)) || wants_json(headers)
}

fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
}

fn is_pjax(headers: &HeaderMap) -> bool {
    headers.get("x-pjax").is_some_and(|v| v.as_bytes() == b"true")
}

/// First media type listed in `Accept`, parameters stripped.
fn first_accept(headers: &HeaderMap) -> Option<&str> {
    let accept = headers.get(ACCEPT)?.to_str().ok()?;
    accept
        .split(',')
        .next()
        .and_then(|t| t.split(';').next())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn accepts_any(headers: &HeaderMap) -> bool {
    matches!(first_accept(headers), None | Some("*/*" | "*"))
}

fn wants_json(headers: &HeaderMap) -> bool {
    first_accept(headers).is_some_and(|t| t.contains("/json") || t.contains("+json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(*k, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn json_accept_wants_json() {
        assert!(expects_json(&headers(&[("accept", "application/json")])));
        assert!(expects_json(&headers(&[(
            "accept",
            "application/vnd.api+json; charset=utf-8, text/html"
        )])));
    }

    #[test]
    fn json_must_be_first_preference() {
        assert!(!expects_json(&headers(&[(
            "accept",
            "text/html, application/json"
        )])));
    }

    #[test]
    fn ajax_without_accept_expects_json() {
        assert!(expects_json(&headers(&[("x-requested-with", "XMLHttpRequest")])));
        assert!(expects_json(&headers(&[
            ("x-requested-with", "XMLHttpRequest"),
            ("accept", "*/*"),
        ])));
    }

    #[test]
    fn pjax_and_html_ajax_do_not() {
        assert!(!expects_json(&headers(&[
            ("x-requested-with", "XMLHttpRequest"),
            ("x-pjax", "true"),
        ])));
        assert!(!expects_json(&headers(&[
            ("x-requested-with", "XMLHttpRequest"),
            ("accept", "text/html"),
        ])));
    }

    #[test]
    fn plain_browser_request_does_not() {
        assert!(!expects_json(&HeaderMap::new()));
        assert!(!expects_json(&headers(&[("accept", "text/html,*/*;q=0.8")])));
    }
}
