//! Request context consumed by the translator.

/// The parts of an in-flight request the translator cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    path: String,
    expects_json: bool,
}

impl RequestContext {
    pub fn new(path: impl Into<String>, expects_json: bool) -> Self {
        Self {
            path: path.into(),
            expects_json,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn expects_json(&self) -> bool {
        self.expects_json
    }

    /// True for `api/*` paths or when the client expects a JSON response.
    pub fn is_api(&self) -> bool {
        self.expects_json || is_api_path(&self.path)
    }
}

fn is_api_path(path: &str) -> bool {
    path.trim_start_matches('/').starts_with("api/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_prefix_is_api() {
        assert!(RequestContext::new("/api/v1/user-roles", false).is_api());
        assert!(RequestContext::new("api/x", false).is_api());
    }

    #[test]
    fn api_prefix_needs_trailing_segment() {
        assert!(!RequestContext::new("/api", false).is_api());
        assert!(!RequestContext::new("/apiary/hives", false).is_api());
    }

    #[test]
    fn json_expectation_makes_any_path_api() {
        assert!(RequestContext::new("/dashboard", true).is_api());
        assert!(!RequestContext::new("/dashboard", false).is_api());
    }
}
