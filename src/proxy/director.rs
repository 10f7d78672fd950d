//! Outbound request targeting.
//!
//! # Responsibilities
//! - Parse the configured upstream into a scheme + authority once
//! - Point every proxied request at that upstream
//!
//! # Design Decisions
//! - Only the URI scheme and authority change; path, query, method,
//!   headers (including the inbound Host) and body are left alone
//! - Plain HTTP only; TLS to the upstream is not supported

use std::str::FromStr;

use axum::body::Body;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{Request, Uri};
use thiserror::Error;

/// Errors parsing `proxy-host`.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("unsupported scheme `{0}` (only http is supported)")]
    UnsupportedScheme(String),

    #[error("invalid host: {0}")]
    InvalidAuthority(#[from] axum::http::uri::InvalidUri),
}

/// The single upstream all proxied traffic goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    pub scheme: Scheme,
    pub authority: Authority,
}

impl UpstreamTarget {
    /// Parse `host:port` or `http://host:port`.
    pub fn parse(proxy_host: &str) -> Result<Self, TargetError> {
        let proxy_host = proxy_host.trim();
        let host = match proxy_host.split_once("://") {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("http") => rest,
            Some((scheme, _)) => return Err(TargetError::UnsupportedScheme(scheme.to_string())),
            None => proxy_host,
        };
        let authority = Authority::from_str(host.trim_end_matches('/'))?;

        Ok(Self {
            scheme: Scheme::HTTP,
            authority,
        })
    }
}

impl std::fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}", self.scheme, self.authority)
    }
}

/// Rewrites request destinations to the upstream target.
#[derive(Debug, Clone)]
pub struct Director {
    target: UpstreamTarget,
}

impl Director {
    pub fn new(target: UpstreamTarget) -> Self {
        Self { target }
    }

    /// Point the request at the upstream.
    pub fn direct(&self, request: &mut Request<Body>) {
        *request.uri_mut() = self.upstream_uri(request.uri());
    }

    fn upstream_uri(&self, original: &Uri) -> Uri {
        let mut parts = original.clone().into_parts();
        parts.scheme = Some(self.target.scheme.clone());
        parts.authority = Some(self.target.authority.clone());
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }

        // Scheme, authority and path are all set, so this cannot fail.
        Uri::from_parts(parts).unwrap_or_else(|_| original.clone())
    }
}
