//! Failure taxonomy.
//!
//! `Failure` is transport-agnostic. The translator maps it to an
//! [`ErrorResponse`](crate::translate::ErrorResponse) and each transport
//! crate maps that to its own wire format.

use crate::api::ApiException;

/// Any failure that reaches the request boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Failure {
    /// Domain failure that renders itself.
    #[error(transparent)]
    Api(#[from] ApiException),

    /// A database query failed.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The requested resource does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Broadcasting an event to connected clients failed.
    #[error("{0}")]
    Broadcast(String),

    /// Raised by the API monitoring probes.
    #[error("{0}")]
    Monitoring(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl Failure {
    /// Creates an unclassified failure.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Stable label for the failure class, used as the throttle key and in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Api(e) => e.kind(),
            Self::Query(_) => "QueryException",
            Self::NotFound(e) if e.cause().is_some() => "ModelNotFoundException",
            Self::NotFound(_) => "NotFoundHttpException",
            Self::Broadcast(_) => "BroadcastException",
            Self::Monitoring(_) => "ApiMonitoringException",
            Self::Other(_) => "Exception",
        }
    }

    /// HTTP status a transport should use when it renders this failure
    /// without the translator (e.g. the default HTML error page).
    pub fn status_hint(&self) -> u16 {
        match self {
            Self::Api(e) => e.status(),
            Self::NotFound(_) => 404,
            Self::Query(_) | Self::Broadcast(_) | Self::Monitoring(_) | Self::Other(_) => 500,
        }
    }
}

impl From<ModelNotFound> for Failure {
    fn from(e: ModelNotFound) -> Self {
        Self::NotFound(e.into())
    }
}

/// A database query failed.
///
/// `Display` yields the driver message only; the statement is kept for logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct QueryError {
    pub sql: String,
    pub message: String,
}

impl QueryError {
    pub fn new(sql: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            message: message.into(),
        }
    }
}

/// Resource-not-found failure, optionally caused by a failed entity lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct NotFoundError {
    message: String,
    cause: Option<ModelNotFound>,
}

impl NotFoundError {
    /// Not found with no specific cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// No route matched the requested path.
    pub fn route(path: &str) -> Self {
        Self::new(format!("The route {} could not be found.", path.trim_start_matches('/')))
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The entity lookup that caused this failure, if any.
    pub fn cause(&self) -> Option<&ModelNotFound> {
        self.cause.as_ref()
    }
}

impl From<ModelNotFound> for NotFoundError {
    fn from(cause: ModelNotFound) -> Self {
        Self {
            message: cause.to_string(),
            cause: Some(cause),
        }
    }
}

/// An entity lookup found no rows.
///
/// `model` is a fully-qualified type identifier. Segments may be separated
/// by `::`, `\` or `/`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No query results for model [{model}]{}", id_suffix(.ids))]
pub struct ModelNotFound {
    model: String,
    ids: Vec<String>,
}

fn id_suffix(ids: &[String]) -> String {
    if ids.is_empty() {
        String::new()
    } else {
        format!(" {}", ids.join(", "))
    }
}

impl ModelNotFound {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ids: Vec::new(),
        }
    }

    /// Lookup failure for the Rust type `T`.
    pub fn of<T: ?Sized>() -> Self {
        Self::new(std::any::type_name::<T>())
    }

    /// Attaches the searched key(s).
    #[must_use]
    pub fn with_ids<I, K>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: ToString,
    {
        self.ids = ids.into_iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Last path segment of the model identifier (`App\Models\User` → `User`).
    pub fn entity_name(&self) -> &str {
        self.model
            .rsplit(['\\', '/', ':'])
            .find(|s| !s.is_empty())
            .unwrap_or(&self.model)
    }

    /// The searched keys joined with `", "`.
    pub fn joined_ids(&self) -> String {
        self.ids.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget;

    #[test]
    fn entity_name_handles_all_separators() {
        assert_eq!(ModelNotFound::new("App\\Models\\User").entity_name(), "User");
        assert_eq!(ModelNotFound::new("app/models/Invoice").entity_name(), "Invoice");
        assert_eq!(ModelNotFound::of::<Widget>().entity_name(), "Widget");
        assert_eq!(ModelNotFound::new("Plain").entity_name(), "Plain");
    }

    #[test]
    fn model_not_found_message_lists_ids() {
        let e = ModelNotFound::new("App\\Models\\User").with_ids([3, 7]);
        assert_eq!(e.to_string(), "No query results for model [App\\Models\\User] 3, 7");
        assert_eq!(e.joined_ids(), "3, 7");

        let bare = ModelNotFound::new("App\\Models\\User");
        assert_eq!(bare.to_string(), "No query results for model [App\\Models\\User]");
    }

    #[test]
    fn not_found_from_lookup_keeps_cause() {
        let failure = Failure::from(ModelNotFound::new("App\\Models\\User").with_ids([5]));
        let Failure::NotFound(nf) = &failure else {
            panic!("expected NotFound, got {failure:?}");
        };
        assert_eq!(nf.cause().map(ModelNotFound::entity_name), Some("User"));
        assert_eq!(failure.kind_name(), "ModelNotFoundException");
        assert_eq!(failure.status_hint(), 404);
    }

    #[test]
    fn route_not_found_message() {
        let nf = NotFoundError::route("/api/nope");
        assert_eq!(nf.message(), "The route api/nope could not be found.");
        assert!(nf.cause().is_none());
    }

    #[test]
    fn query_error_displays_driver_message_only() {
        let e = QueryError::new("select 1", "syntax error");
        assert_eq!(Failure::from(e).to_string(), "syntax error");
    }
}
