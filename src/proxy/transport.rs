//! Request-sending capability.
//!
//! # Responsibilities
//! - Define the `Transport` seam: send a request, get a response or a failure
//! - Provide the real implementation over a pooled hyper client
//!
//! # Design Decisions
//! - Object-safe (`async_trait`) so the pipeline can hold `Arc<dyn Transport>`
//!   and tests can substitute doubles
//! - Wrappers such as the body rewriter are themselves transports

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure while exchanging a request with the upstream.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connecting, writing the request or reading the response head failed.
    #[error("upstream request failed: {0}")]
    Send(#[source] BoxError),

    /// The response head arrived but its body could not be read to the end.
    #[error("failed to read upstream response body: {0}")]
    ReadBody(#[source] BoxError),
}

/// Sends a request and yields the upstream response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>, TransportError>;
}

/// Transport backed by hyper-util's connection-pooling client.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client<HttpConnector, Body>,
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>, TransportError> {
        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| TransportError::Send(Box::new(e)))?;

        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}
