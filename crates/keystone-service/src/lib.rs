//! Keystone Service: core logic for the Keystone API server.
//!
//! This crate contains all transport-agnostic logic:
//! the failure taxonomy, failure → JSON translation, throttled failure
//! reporting, and the user-role registry with its API resources.
//!
//! The `keystone-http` crate depends on this crate and provides the axum
//! adapter.
//!
//! No transport dependencies: no axum, no HTTP types.

pub mod api;
pub mod context;
pub mod error;
pub mod report;
pub mod resource;
pub mod roles;
pub mod translate;

use std::sync::Arc;

use report::{ReportSink, Reporter, TracingSink};
use roles::RoleRegistry;
use translate::{Translator, TranslatorConfig};

pub use context::RequestContext;
pub use error::Failure;

/// Configuration subset relevant to the service layer.
///
/// Transport-specific config (ports, CORS origins, proxies) stays in the
/// binary crate's `Config` struct.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub debug: bool,
    pub expose_unclassified_messages: bool,
    pub report_buffer: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            debug: false,
            expose_unclassified_messages: true,
            report_buffer: 1024,
        }
    }
}

/// Shared service state, cloneable across all transport handlers.
#[derive(Clone)]
pub struct ServiceState {
    inner: Arc<Inner>,
}

struct Inner {
    translator: Translator,
    reporter: Reporter,
    roles: RoleRegistry,
}

impl ServiceState {
    /// Creates a new service state reporting to the `tracing` sink.
    /// Must be called inside a tokio runtime.
    pub fn new(config: &ServiceConfig) -> Self {
        Self::with_sink(config, TracingSink)
    }

    /// Creates a service state that forwards failure reports to `sink`.
    pub fn with_sink(config: &ServiceConfig, sink: impl ReportSink) -> Self {
        Self {
            inner: Arc::new(Inner {
                translator: Translator::new(TranslatorConfig {
                    debug: config.debug,
                    expose_unclassified_messages: config.expose_unclassified_messages,
                }),
                reporter: Reporter::spawn(sink, config.report_buffer),
                roles: RoleRegistry::new(),
            }),
        }
    }

    /// Creates a state with default settings (for tests and ephemeral use).
    pub fn new_in_memory() -> Self {
        Self::new(&ServiceConfig::default())
    }

    pub fn translator(&self) -> &Translator {
        &self.inner.translator
    }

    pub fn reporter(&self) -> &Reporter {
        &self.inner.reporter
    }

    pub fn roles(&self) -> &RoleRegistry {
        &self.inner.roles
    }
}
