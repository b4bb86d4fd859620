//! Server configuration via CLI args and environment variables.

use clap::Parser;

use keystone_http::{HttpConfig, Maintenance, TrustedProxies};
use keystone_service::ServiceConfig;

/// HTTP API server for Keystone user role management.
#[derive(Parser, Debug, Clone)]
#[command(name = "keystone-server", version, about)]
pub struct Config {
    /// Bind address.
    #[arg(long, default_value = "0.0.0.0", env = "KEYSTONE_HOST")]
    pub host: String,

    /// Bind port.
    #[arg(long, default_value_t = 8000, env = "KEYSTONE_PORT")]
    pub port: u16,

    /// Log level.
    #[arg(long, default_value = "info", env = "KEYSTONE_LOG_LEVEL")]
    pub log_level: String,

    /// Log format: "text" or "json".
    #[arg(long, default_value = "text", env = "KEYSTONE_LOG_FORMAT")]
    pub log_format: String,

    /// Expose raw failure detail in the `debug` field of API error bodies.
    #[arg(long, env = "KEYSTONE_DEBUG")]
    pub debug: bool,

    /// Use the raw message of unclassified failures as the `error` label.
    #[arg(
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        env = "KEYSTONE_EXPOSE_UNCLASSIFIED_MESSAGES"
    )]
    pub expose_unclassified_messages: bool,

    /// CORS allowed origins (comma-separated). Empty for no CORS.
    #[arg(long, env = "KEYSTONE_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Proxies whose X-Forwarded-For header is trusted (comma-separated, "*" for all).
    #[arg(long, env = "KEYSTONE_TRUSTED_PROXIES", value_delimiter = ',')]
    pub trusted_proxies: Vec<String>,

    /// Maximum request body size in bytes (0 = unlimited).
    #[arg(long, default_value_t = keystone_http::state::DEFAULT_MAX_POST_SIZE, env = "KEYSTONE_MAX_POST_SIZE")]
    pub max_post_size: u64,

    /// Start in maintenance mode (every route except /up answers 503).
    #[arg(long, env = "KEYSTONE_MAINTENANCE")]
    pub maintenance: bool,

    /// Retry-After seconds advertised during maintenance.
    #[arg(long, env = "KEYSTONE_MAINTENANCE_RETRY_AFTER")]
    pub maintenance_retry_after: Option<u64>,

    /// Capacity of the failure report queue.
    #[arg(long, default_value_t = 1024, env = "KEYSTONE_REPORT_BUFFER")]
    pub report_buffer: usize,
}

impl Config {
    /// Parses configuration from CLI args and env vars.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Service-layer subset.
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            debug: self.debug,
            expose_unclassified_messages: self.expose_unclassified_messages,
            report_buffer: self.report_buffer,
        }
    }

    /// HTTP transport subset.
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            cors_origins: self.cors_origins.clone(),
            trusted_proxies: TrustedProxies::from_list(&self.trusted_proxies),
            max_post_size: self.max_post_size,
            maintenance: self.maintenance.then_some(Maintenance {
                retry_after_secs: self.maintenance_retry_after,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("keystone-server").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn defaults() {
        let config = parse(&[]);
        assert_eq!(config.port, 8000);
        let service = config.service_config();
        assert!(!service.debug);
        assert!(service.expose_unclassified_messages);
        let http = config.http_config();
        assert!(http.maintenance.is_none());
        assert_eq!(http.trusted_proxies, TrustedProxies::None);
        assert_eq!(http.max_post_size, keystone_http::state::DEFAULT_MAX_POST_SIZE);
    }

    #[test]
    fn flags_map_onto_layer_configs() {
        let config = parse(&[
            "--debug",
            "--expose-unclassified-messages",
            "false",
            "--trusted-proxies",
            "10.0.0.1,10.0.0.2",
            "--maintenance",
            "--maintenance-retry-after",
            "90",
        ]);
        let service = config.service_config();
        assert!(service.debug);
        assert!(!service.expose_unclassified_messages);

        let http = config.http_config();
        assert_eq!(
            http.maintenance,
            Some(Maintenance {
                retry_after_secs: Some(90)
            })
        );
        assert!(http.trusted_proxies.trusts("10.0.0.2".parse().unwrap()));
    }
}
