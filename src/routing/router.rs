//! Edge dispatch between static files and the proxy.
//!
//! # Responsibilities
//! - Decide, per request, whether the static tree or the upstream answers
//! - Hand the request to the chosen handler
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Every request takes exactly one of the two destinations

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;

use crate::http::static_files::StaticFiles;
use crate::proxy::pipeline::ProxyPipeline;
use crate::routing::matcher::PathPrefixMatcher;

/// Where a request is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Static,
    Proxy,
}

impl Destination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::Static => "static",
            Destination::Proxy => "proxy",
        }
    }
}

/// Routes requests to the static tree or the upstream proxy.
#[derive(Clone)]
pub struct EdgeDispatcher {
    static_prefix: PathPrefixMatcher,
    static_files: StaticFiles,
    proxy: ProxyPipeline,
}

impl EdgeDispatcher {
    pub fn new(static_files: StaticFiles, proxy: ProxyPipeline) -> Self {
        Self {
            static_prefix: PathPrefixMatcher::new(static_files.prefix()),
            static_files,
            proxy,
        }
    }

    /// Pick the destination for a request path.
    pub fn route(&self, path: &str) -> Destination {
        if self.static_prefix.matches_path(path) {
            Destination::Static
        } else {
            Destination::Proxy
        }
    }

    /// Handle a request on whichever side `route` selects.
    pub async fn dispatch(&self, request: Request<Body>, client: Option<SocketAddr>) -> Response {
        let destination = self.route(request.uri().path());
        self.dispatch_to(destination, request, client).await
    }

    /// Handle a request on an already chosen side.
    pub async fn dispatch_to(
        &self,
        destination: Destination,
        request: Request<Body>,
        client: Option<SocketAddr>,
    ) -> Response {
        match destination {
            Destination::Static => self.static_files.serve(request).await,
            Destination::Proxy => self.proxy.forward(request, client).await,
        }
    }
}
