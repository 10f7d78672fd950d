//! Proxy pipeline: direct, send, map failures.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers on the way out and on the way back
//! - Record the client in `X-Forwarded-For`
//! - Run the director, then the transport
//! - Turn transport failures into `502 Bad Gateway`
//!
//! # Design Decisions
//! - No retries: one attempt per inbound request
//! - A failure only affects the request that hit it

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, Response, StatusCode, Version};
use axum::response::IntoResponse;

use crate::observability::metrics;
use crate::proxy::director::Director;
use crate::proxy::transport::Transport;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Headers that describe a single connection and must not be forwarded.
///
/// `TE: trailers` is dropped as well: the rewriter buffers the whole body and
/// discards upstream trailers, so there is nothing for it to announce.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "proxy-connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Forwards requests to the upstream through a transport.
#[derive(Clone)]
pub struct ProxyPipeline {
    director: Director,
    transport: Arc<dyn Transport>,
}

impl ProxyPipeline {
    pub fn new(director: Director, transport: Arc<dyn Transport>) -> Self {
        Self {
            director,
            transport,
        }
    }

    /// Forward one request and return the upstream (or gateway error) response.
    pub async fn forward(&self, mut request: Request<Body>, client: Option<SocketAddr>) -> Response<Body> {
        remove_hop_by_hop(request.headers_mut());
        if let Some(client) = client {
            append_forwarded_for(request.headers_mut(), client);
        }
        *request.version_mut() = Version::HTTP_11;

        self.director.direct(&mut request);
        let upstream_uri = request.uri().clone();

        match self.transport.send(request).await {
            Ok(mut response) => {
                remove_hop_by_hop(response.headers_mut());
                response
            }
            Err(e) => {
                tracing::error!(upstream = %upstream_uri, error = %e, "Upstream error");
                metrics::record_upstream_error();
                (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
            }
        }
    }
}

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn remove_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Append the client IP to `X-Forwarded-For`, merging earlier hops.
fn append_forwarded_for(headers: &mut HeaderMap, client: SocketAddr) {
    let ip = client.ip().to_string();
    let prior: Vec<&str> = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    let value = if prior.is_empty() {
        ip
    } else {
        format!("{}, {}", prior.join(", "), ip)
    };

    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}
