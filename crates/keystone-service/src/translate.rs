//! Failure → JSON error translation.
//!
//! The translator is a pure function of the request context, the failure and
//! its [`TranslatorConfig`]. It never fails: every failure has a mapping,
//! including a catch-all.

use serde::Serialize;

use crate::api::{FieldErrors, Renderable};
use crate::context::RequestContext;
use crate::error::Failure;

const DATABASE_ERROR_MESSAGE: &str = "A database error occurred.";
const RESOURCE_NOT_FOUND_MESSAGE: &str = "Resource not found.";
const GENERIC_ERROR_MESSAGE: &str = "An error occurred.";
const REDACTED_KIND: &str = "InternalError";

/// Translator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslatorConfig {
    /// Expose raw failure text in the `debug` field.
    pub debug: bool,
    /// Use the raw message of unclassified failures as their `error` label.
    /// When disabled the label is `InternalError`.
    pub expose_unclassified_messages: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            debug: false,
            expose_unclassified_messages: true,
        }
    }
}

/// JSON error payload plus the envelope data (status, headers) a transport
/// needs to emit it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    /// Human-readable message.
    pub message: String,
    /// Machine-readable error kind (e.g. "QueryException", "ModelNotFoundException").
    #[serde(rename = "error")]
    pub kind: String,
    /// Raw failure detail, present only in debug mode.
    pub debug: Option<String>,
    /// Per-field validation messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    #[serde(skip)]
    pub status: u16,
    #[serde(skip)]
    pub headers: Vec<(String, String)>,
}

impl ErrorResponse {
    pub fn new(status: u16, message: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: kind.into(),
            debug: None,
            errors: None,
            status,
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_debug(mut self, debug: Option<String>) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = Some(errors);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Result of translating a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Emit this JSON error.
    Json(ErrorResponse),
    /// Not an API request: fall back to the transport's default rendering.
    Defer,
}

impl Rendered {
    pub fn into_json(self) -> Option<ErrorResponse> {
        match self {
            Self::Json(body) => Some(body),
            Self::Defer => None,
        }
    }
}

/// Maps failures to JSON error responses for API requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Translator {
    config: TranslatorConfig,
}

impl Translator {
    pub fn new(config: TranslatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> TranslatorConfig {
        self.config
    }

    /// Translates `failure` raised while serving `ctx`.
    pub fn render(&self, ctx: &RequestContext, failure: &Failure) -> Rendered {
        if !ctx.is_api() {
            return Rendered::Defer;
        }

        let response = match failure {
            Failure::Api(e) => e.render(ctx),
            Failure::Query(_) => ErrorResponse::new(500, DATABASE_ERROR_MESSAGE, "QueryException")
                .with_debug(self.debug_detail(failure)),
            Failure::NotFound(nf) => {
                let response = match nf.cause() {
                    Some(lookup) => ErrorResponse::new(
                        404,
                        format!(
                            "{} with id '{}' is not found.",
                            lookup.entity_name(),
                            lookup.joined_ids()
                        ),
                        "ModelNotFoundException",
                    ),
                    None => {
                        ErrorResponse::new(404, RESOURCE_NOT_FOUND_MESSAGE, "NotFoundHttpException")
                    }
                };
                response.with_debug(self.debug_detail(failure))
            }
            Failure::Broadcast(_) | Failure::Monitoring(_) | Failure::Other(_) => {
                let kind = if self.config.expose_unclassified_messages {
                    failure.to_string()
                } else {
                    REDACTED_KIND.to_string()
                };
                ErrorResponse::new(500, GENERIC_ERROR_MESSAGE, kind)
            }
        };

        Rendered::Json(response)
    }

    fn debug_detail(&self, failure: &Failure) -> Option<String> {
        self.config.debug.then(|| failure.to_string())
    }
}
