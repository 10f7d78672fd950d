//! Body-rewriting transport.
//!
//! Wraps another [`Transport`]; once the upstream answers, the whole body is
//! buffered, run through the [`PatternSet`] and handed back as a fixed-length
//! body with a matching `Content-Length`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderValue, Request, Response};

use crate::proxy::transport::{Transport, TransportError};
use crate::rewrite::rules::PatternSet;

/// Transport decorator applying find-and-replace rules to response bodies.
pub struct RewriteTransport<T> {
    inner: T,
    patterns: Arc<PatternSet>,
}

impl<T: Transport> RewriteTransport<T> {
    pub fn new(inner: T, patterns: Arc<PatternSet>) -> Self {
        Self { inner, patterns }
    }
}

#[async_trait]
impl<T: Transport> Transport for RewriteTransport<T> {
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>, TransportError> {
        let response = self.inner.send(request).await?;
        let (mut parts, body) = response.into_parts();

        // No size cap: the body is held in memory in full.
        let original = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(|e| TransportError::ReadBody(Box::new(e)))?;

        let rewritten = self.patterns.apply_bytes(&original);

        tracing::trace!(
            original_len = original.len(),
            rewritten_len = rewritten.len(),
            "Rewrote upstream body"
        );

        parts.headers.remove(header::TRANSFER_ENCODING);
        parts
            .headers
            .insert(header::CONTENT_LENGTH, HeaderValue::from(rewritten.len()));

        Ok(Response::from_parts(parts, Body::from(rewritten)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RewriteRule;
    use axum::body::Bytes;
    use axum::http::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers every request with a canned status, headers and body.
    struct FixedTransport {
        body: &'static str,
        calls: AtomicUsize,
    }

    impl FixedTransport {
        fn new(body: &'static str) -> Self {
            Self {
                body,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for FixedTransport {
        async fn send(&self, _request: Request<Body>) -> Result<Response<Body>, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Response::builder()
                .status(StatusCode::CREATED)
                .header(header::CONTENT_TYPE, "text/html")
                .header(header::CONTENT_LENGTH, self.body.len().to_string())
                .header(header::TRANSFER_ENCODING, "chunked")
                .header("x-upstream", "yes")
                .body(Body::from(self.body))
                .unwrap())
        }
    }

    struct FailingSend;

    #[async_trait]
    impl Transport for FailingSend {
        async fn send(&self, _request: Request<Body>) -> Result<Response<Body>, TransportError> {
            Err(TransportError::Send("connection refused".into()))
        }
    }

    /// Sends the head fine, then the body stream errors part way.
    struct BrokenBody;

    #[async_trait]
    impl Transport for BrokenBody {
        async fn send(&self, _request: Request<Body>) -> Result<Response<Body>, TransportError> {
            let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
                Ok(Bytes::from_static(b"A B ")),
                Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
            ];
            Ok(Response::new(Body::from_stream(futures_util::stream::iter(chunks))))
        }
    }

    fn patterns(pairs: &[(&str, &str)]) -> Arc<PatternSet> {
        let rules: Vec<_> = pairs.iter().map(|(f, r)| RewriteRule::new(*f, *r)).collect();
        Arc::new(PatternSet::compile(&rules).unwrap())
    }

    fn request() -> Request<Body> {
        Request::builder().uri("http://upstream/").body(Body::empty()).unwrap()
    }

    async fn body_string(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_rewrites_body_and_fixes_length() {
        let transport = RewriteTransport::new(
            FixedTransport::new("A B C -pq-pxxq-"),
            patterns(&[("A", "a"), ("B", "b"), ("p(x*)q", "Tee")]),
        );

        let response = transport.send(request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["x-upstream"], "yes");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
        assert!(response.headers().get(header::TRANSFER_ENCODING).is_none());

        let expected = "a b C -Tee-Tee-";
        assert_eq!(response.headers()[header::CONTENT_LENGTH], expected.len().to_string().as_str());
        assert_eq!(body_string(response).await, expected);
    }

    #[tokio::test]
    async fn test_shrinking_body_length() {
        let transport = RewriteTransport::new(
            FixedTransport::new("remove-me-please"),
            patterns(&[("-me-please", "")]),
        );

        let response = transport.send(request()).await.unwrap();
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "6");
        assert_eq!(body_string(response).await, "remove");
    }

    #[tokio::test]
    async fn test_no_rules_passes_body_through() {
        let transport = RewriteTransport::new(
            FixedTransport::new("untouched body"),
            Arc::new(PatternSet::default()),
        );

        let response = transport.send(request()).await.unwrap();
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "14");
        assert_eq!(body_string(response).await, "untouched body");
        assert_eq!(transport.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_send_failure_propagates() {
        let transport = RewriteTransport::new(FailingSend, patterns(&[("A", "a")]));

        let Err(err) = transport.send(request()).await else {
            panic!("send failure must not produce a response");
        };
        assert!(matches!(err, TransportError::Send(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_body_read_failure_propagates() {
        let transport = RewriteTransport::new(BrokenBody, patterns(&[("A", "a")]));

        let Err(err) = transport.send(request()).await else {
            panic!("read failure must not produce a response");
        };
        assert!(matches!(err, TransportError::ReadBody(_)));
    }
}
