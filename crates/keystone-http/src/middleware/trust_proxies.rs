//! Trusted proxy resolution: determines the real client IP.

use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::state::{AppState, TrustedProxies};

/// Client address as seen after proxy resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

/// Resolves the client IP. `X-Forwarded-For` is only honoured when the
/// direct peer is a trusted proxy.
pub fn client_ip(req: &Request, proxies: &TrustedProxies) -> Option<IpAddr> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip());

    let trusted = match peer {
        Some(ip) => proxies.trusts(ip),
        None => *proxies == TrustedProxies::All,
    };

    if trusted
        && let Some(xff) = req.headers().get("x-forwarded-for")
        && let Ok(s) = xff.to_str()
        && let Some(first) = s.split(',').next()
        && let Ok(ip) = first.trim().parse::<IpAddr>()
    {
        return Some(ip);
    }

    peer
}

/// Records the resolved [`ClientIp`] as a request extension.
pub async fn trust_proxies_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(ip) = client_ip(&req, state.trusted_proxies()) {
        req.extensions_mut().insert(ClientIp(ip));
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(peer: Option<&str>, xff: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(xff) = xff {
            builder = builder.header("x-forwarded-for", xff);
        }
        let mut req = builder.body(Body::empty()).unwrap();
        if let Some(peer) = peer {
            req.extensions_mut()
                .insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
        }
        req
    }

    #[test]
    fn untrusted_peer_ignores_forwarded_for() {
        let req = request(Some("203.0.113.9:5000"), Some("198.51.100.1"));
        assert_eq!(
            client_ip(&req, &TrustedProxies::None),
            Some("203.0.113.9".parse().unwrap())
        );
    }

    #[test]
    fn trusted_peer_uses_first_forwarded_for() {
        let req = request(Some("10.0.0.1:5000"), Some("198.51.100.1, 10.0.0.1"));
        let proxies = TrustedProxies::Only(vec!["10.0.0.1".parse().unwrap()]);
        assert_eq!(
            client_ip(&req, &proxies),
            Some("198.51.100.1".parse().unwrap())
        );
    }

    #[test]
    fn wildcard_trusts_without_connect_info() {
        let req = request(None, Some("198.51.100.7"));
        assert_eq!(
            client_ip(&req, &TrustedProxies::All),
            Some("198.51.100.7".parse().unwrap())
        );
        assert_eq!(client_ip(&req, &TrustedProxies::None), None);
    }

    #[test]
    fn garbage_forwarded_for_falls_back_to_peer() {
        let req = request(Some("10.0.0.1:5000"), Some("not-an-ip"));
        assert_eq!(
            client_ip(&req, &TrustedProxies::All),
            Some("10.0.0.1".parse().unwrap())
        );
    }
}
