//! HTTP application state: wraps `ServiceState` with HTTP-specific fields.
//!
//! `AppState` provides transparent access to all `ServiceState` methods
//! via `Deref`, and adds transport config like CORS origins, trusted
//! proxies, the post size limit and maintenance mode.

use std::net::IpAddr;
use std::ops::Deref;
use std::sync::Arc;

use keystone_service::ServiceState;

/// Default request body limit (8 MiB).
pub const DEFAULT_MAX_POST_SIZE: u64 = 8 * 1024 * 1024;

/// Proxies whose `X-Forwarded-For` header is honoured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TrustedProxies {
    /// Never trust forwarding headers.
    #[default]
    None,
    /// Trust any peer.
    All,
    /// Trust only these peers.
    Only(Vec<IpAddr>),
}

impl TrustedProxies {
    /// Parses a list of IPs; a lone `*` trusts every peer. Unparseable
    /// entries are skipped with a warning.
    pub fn from_list(entries: &[String]) -> Self {
        if entries.is_empty() {
            return Self::None;
        }
        if entries.iter().any(|e| e.trim() == "*") {
            return Self::All;
        }
        let ips = entries
            .iter()
            .filter_map(|e| match e.trim().parse::<IpAddr>() {
                Ok(ip) => Some(ip),
                Err(_) => {
                    tracing::warn!(entry = %e, "ignoring invalid trusted proxy");
                    None
                }
            })
            .collect();
        Self::Only(ips)
    }

    pub fn trusts(&self, peer: IpAddr) -> bool {
        match self {
            Self::None => false,
            Self::All => true,
            Self::Only(ips) => ips.contains(&peer),
        }
    }
}

/// Maintenance mode settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Maintenance {
    /// Seconds clients should wait before retrying.
    pub retry_after_secs: Option<u64>,
}

/// HTTP transport settings.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub cors_origins: Vec<String>,
    pub trusted_proxies: TrustedProxies,
    /// Maximum request body size in bytes (0 = unlimited).
    pub max_post_size: u64,
    /// `Some` while the application is down for maintenance.
    pub maintenance: Option<Maintenance>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![],
            trusted_proxies: TrustedProxies::None,
            max_post_size: DEFAULT_MAX_POST_SIZE,
            maintenance: None,
        }
    }
}

/// Shared HTTP application state, cloneable across handlers.
///
/// Wraps `ServiceState` (business logic) and adds HTTP-specific fields.
/// All `ServiceState` methods are available directly via `Deref`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppInner>,
}

struct AppInner {
    service: ServiceState,
    config: HttpConfig,
}

impl Deref for AppState {
    type Target = ServiceState;

    fn deref(&self) -> &ServiceState {
        &self.inner.service
    }
}

impl AppState {
    /// Creates a new HTTP application state.
    pub fn new(service: ServiceState, config: HttpConfig) -> Self {
        Self {
            inner: Arc::new(AppInner { service, config }),
        }
    }

    /// Creates an in-memory application state (for tests and ephemeral use).
    pub fn new_in_memory() -> Self {
        Self::new(ServiceState::new_in_memory(), HttpConfig::default())
    }

    /// Returns the configured CORS allowed origins.
    pub fn cors_origins(&self) -> &[String] {
        &self.inner.config.cors_origins
    }

    pub fn trusted_proxies(&self) -> &TrustedProxies {
        &self.inner.config.trusted_proxies
    }

    pub fn max_post_size(&self) -> u64 {
        self.inner.config.max_post_size
    }

    pub fn maintenance(&self) -> Option<Maintenance> {
        self.inner.config.maintenance
    }

    /// Returns a reference to the underlying service state.
    pub fn service(&self) -> &ServiceState {
        &self.inner.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trusted_proxies_parsing() {
        assert_eq!(TrustedProxies::from_list(&[]), TrustedProxies::None);
        assert_eq!(
            TrustedProxies::from_list(&["10.0.0.1".into(), "*".into()]),
            TrustedProxies::All
        );

        let only = TrustedProxies::from_list(&["10.0.0.1".into(), "not-an-ip".into()]);
        assert!(only.trusts("10.0.0.1".parse().unwrap()));
        assert!(!only.trusts("10.0.0.2".parse().unwrap()));
        assert!(!TrustedProxies::None.trusts("10.0.0.1".parse().unwrap()));
    }
}
