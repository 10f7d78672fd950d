//! Startup orchestration.
//!
//! # Responsibilities
//! - Build every serving component from a validated configuration
//! - Start the optional metrics exporter
//! - Bind the listener last
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{ConfigError, ProxyConfig};
use crate::http::static_files::StaticFiles;
use crate::http::HttpServer;
use crate::observability::metrics;
use crate::proxy::{Director, HttpTransport, ProxyPipeline, TargetError, UpstreamTarget};
use crate::rewrite::{PatternError, PatternSet, RewriteTransport};
use crate::routing::EdgeDispatcher;

/// Anything that stops the proxy from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("invalid proxy-host: {0}")]
    Target(#[from] TargetError),

    #[error("invalid metrics address `{0}`")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter on {address}: {source}")]
    Metrics {
        address: SocketAddr,
        #[source]
        source: BuildError,
    },

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Compile rules, resolve the upstream and assemble the server.
pub fn build_server(config: &ProxyConfig) -> Result<HttpServer, StartupError> {
    let rules = config.regex_find_replace.to_ordered();
    let patterns = Arc::new(PatternSet::compile(&rules)?);
    let target = UpstreamTarget::parse(&config.proxy_host)?;

    tracing::info!(
        upstream = %target,
        rules = patterns.len(),
        static_prefix = %config.static_dir_url_root,
        static_root = %config.static_dir_root,
        "Proxy components initialized"
    );

    let transport = RewriteTransport::new(HttpTransport::new(), patterns);
    let pipeline = ProxyPipeline::new(Director::new(target), Arc::new(transport));
    let static_files = StaticFiles::new(&config.static_dir_url_root, &config.static_dir_root);

    Ok(HttpServer::new(EdgeDispatcher::new(static_files, pipeline)))
}

/// Bind the configured listen address.
pub async fn bind(config: &ProxyConfig) -> Result<TcpListener, StartupError> {
    let address = config.listen_address();
    TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })
}

/// Full startup: metrics, components, listener.
pub async fn start(config: &ProxyConfig) -> Result<(HttpServer, TcpListener), StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr).map_err(|source| StartupError::Metrics { address: addr, source })?;
    }

    let server = build_server(config)?;
    let listener = bind(config).await?;
    Ok((server, listener))
}
