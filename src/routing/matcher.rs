//! Route matching logic.
//!
//! # Responsibilities
//! - Match the static prefix against the request path
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Literal string prefix, not path-segment aware ("/public" matches "/publicity")
//! - An empty prefix matches nothing, which disables static serving

use axum::body::Body;
use axum::http::Request;

/// Matches request paths that start with a fixed prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_enabled(&self) -> bool {
        !self.prefix.is_empty()
    }

    pub fn matches_path(&self, path: &str) -> bool {
        self.is_enabled() && path.starts_with(&self.prefix)
    }

    pub fn matches(&self, req: &Request<Body>) -> bool {
        self.matches_path(req.uri().path())
    }
}
