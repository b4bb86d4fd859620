//! Self-rendering API exceptions.
//!
//! Each variant owns its message, status and error kind. The translator
//! hands them the request context unchanged and returns whatever they render.

use std::collections::BTreeMap;

use crate::context::RequestContext;
use crate::translate::ErrorResponse;

/// A failure that knows how to turn itself into an [`ErrorResponse`].
pub trait Renderable {
    fn render(&self, ctx: &RequestContext) -> ErrorResponse;
}

/// Field name → validation messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Domain-specific API failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiException {
    /// Request payload failed validation.
    #[error("{message}")]
    Validation { message: String, errors: FieldErrors },

    /// Request body could not be parsed.
    #[error("{0}")]
    MalformedBody(String),

    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// Client exceeded its request budget.
    #[error("Too Many Attempts.")]
    TooManyRequests { retry_after_secs: u64 },

    /// Request body exceeds the configured limit.
    #[error("The POST data is too large.")]
    PayloadTooLarge { limit_bytes: u64 },

    /// Application is in maintenance mode.
    #[error("Service Unavailable")]
    ServiceUnavailable { retry_after_secs: Option<u64> },

    /// Requested API version is not served.
    #[error("API version '{requested}' is not supported.")]
    UnsupportedVersion { requested: String },
}

impl ApiException {
    /// Validation failure for a single field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.clone()]);
        Self::Validation { message, errors }
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::Validation { .. } => 422,
            Self::MalformedBody(_) | Self::UnsupportedVersion { .. } => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::TooManyRequests { .. } => 429,
            Self::PayloadTooLarge { .. } => 413,
            Self::ServiceUnavailable { .. } => 503,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "ValidationException",
            Self::MalformedBody(_) => "BadRequestHttpException",
            Self::Unauthorized(_) => "UnauthorizedException",
            Self::Forbidden(_) => "ForbiddenException",
            Self::TooManyRequests { .. } => "TooManyRequestsException",
            Self::PayloadTooLarge { .. } => "PostTooLargeException",
            Self::ServiceUnavailable { .. } => "MaintenanceModeException",
            Self::UnsupportedVersion { .. } => "UnsupportedApiVersionException",
        }
    }
}

impl Renderable for ApiException {
    fn render(&self, _ctx: &RequestContext) -> ErrorResponse {
        let response = ErrorResponse::new(self.status(), self.to_string(), self.kind());
        match self {
            Self::Validation { errors, .. } => response.with_errors(errors.clone()),
            Self::TooManyRequests { retry_after_secs } => {
                response.with_header("retry-after", retry_after_secs.to_string())
            }
            Self::ServiceUnavailable {
                retry_after_secs: Some(secs),
            } => response.with_header("retry-after", secs.to_string()),
            _ => response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RequestContext {
        RequestContext::new("/api/v1/user-roles", true)
    }

    #[test]
    fn validation_renders_field_errors() {
        let e = ApiException::invalid_field("role_name", "The role name field is required.");
        let r = e.render(&ctx());
        assert_eq!(r.status, 422);
        assert_eq!(r.kind, "ValidationException");
        assert_eq!(r.message, "The role name field is required.");
        let errors = r.errors.expect("errors present");
        assert_eq!(errors["role_name"], vec!["The role name field is required."]);
    }

    #[test]
    fn maintenance_sets_retry_after_when_known() {
        let r = ApiException::ServiceUnavailable {
            retry_after_secs: Some(60),
        }
        .render(&ctx());
        assert_eq!(r.status, 503);
        assert_eq!(r.headers, vec![("retry-after".to_string(), "60".to_string())]);

        let r = ApiException::ServiceUnavailable {
            retry_after_secs: None,
        }
        .render(&ctx());
        assert!(r.headers.is_empty());
    }

    #[test]
    fn self_rendered_responses_carry_no_debug() {
        let r = ApiException::PayloadTooLarge { limit_bytes: 10 }.render(&ctx());
        assert_eq!(r.status, 413);
        assert_eq!(r.kind, "PostTooLargeException");
        assert!(r.debug.is_none());
    }
}
